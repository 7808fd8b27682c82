#[cfg(feature = "serde-serialize")]
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, PartialOrd, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize))]
pub struct SessionTag(String);

impl SessionTag {
    pub fn new(tag: &str) -> Self {
        Self(tag.to_string())
    }

    pub fn inner(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let tag = SessionTag::new("drop_rig");
        assert_eq!(tag.inner(), "drop_rig");
    }

    #[test]
    fn test_clone() {
        let tag = SessionTag::new("drop_rig");
        let cloned_tag = tag.clone();
        assert_eq!(tag, cloned_tag);
    }
}
