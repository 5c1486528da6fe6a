use std::fmt;

/// Declares a string-backed identifier owned by the journey data set.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Unique id of a marker/content binding.
    ChannelId
);
string_id!(PoiId);
string_id!(
    /// Reference to a marker asset in the tracking data set.
    MarkerRef
);
string_id!(
    /// Reference to buildable content (mesh, video, landmark model).
    ContentRef
);

/// Id of an object handed to the scene host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

impl ObjectId {
    pub fn index(&self) -> u64 {
        self.0
    }
}

/// Monotonic allocator for [`ObjectId`]s.
#[derive(Debug, Default)]
pub struct ObjectIds {
    next: u64,
}

impl ObjectIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> ObjectId {
        let id = ObjectId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelId, ObjectIds};

    #[test]
    fn channel_ids_compare_by_value() {
        assert_eq!(ChannelId::new("a-1"), ChannelId::from("a-1"));
        assert_eq!(ChannelId::new("a-1").to_string(), "a-1");
    }

    #[test]
    fn object_ids_are_unique_and_ordered() {
        let mut ids = ObjectIds::new();
        let a = ids.alloc();
        let b = ids.alloc();
        assert_ne!(a, b);
        assert!(a < b);
    }
}
