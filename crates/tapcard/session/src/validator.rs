//! Tag filtering and connection

use tracing::{debug, warn};

use crate::{Radio, Result, SessionError, TagFamily, TagHandle};

/// Application identifier advertised by wallet cards
pub const ARCULUS_AID: &str = "415243554C55530157000";

/// Picks the wallet card out of a batch of detected tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagValidator {
    expected_aid: &'static str,
}

impl Default for TagValidator {
    fn default() -> Self {
        Self::new(ARCULUS_AID)
    }
}

impl TagValidator {
    /// Accept ISO 7816 tags advertising exactly `expected_aid`
    pub const fn new(expected_aid: &'static str) -> Self {
        Self { expected_aid }
    }

    /// The AID tags must advertise
    pub const fn expected_aid(&self) -> &'static str {
        self.expected_aid
    }

    /// Whether a single tag qualifies
    pub fn accepts(&self, tag: &TagHandle) -> bool {
        tag.family() == TagFamily::Iso7816 && tag.selected_aid() == Some(self.expected_aid)
    }

    /// First qualifying tag of a batch
    pub fn select(&self, tags: &[TagHandle]) -> Option<TagHandle> {
        tags.iter().find(|tag| self.accepts(tag)).cloned()
    }

    /// Select a qualifying tag, connect it and acknowledge it once
    pub async fn validate<R: Radio + ?Sized>(
        &self,
        radio: &R,
        tags: &[TagHandle],
    ) -> Result<TagHandle> {
        let Some(tag) = self.select(tags) else {
            warn!(
                detected = tags.len(),
                expected_aid = self.expected_aid,
                "No detected tag is a wallet card"
            );
            return Err(SessionError::UnknownTag);
        };

        radio.connect(&tag).await?;
        radio.acknowledge();
        debug!(family = %tag.family(), "Connected to wallet card");
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::{Tag, TransportError};

    #[derive(Debug)]
    struct StaticTag {
        family: TagFamily,
        aid: Option<&'static str>,
    }

    #[async_trait]
    impl Tag for StaticTag {
        fn family(&self) -> TagFamily {
            self.family
        }

        fn selected_aid(&self) -> Option<&str> {
            self.aid
        }

        async fn transmit(&self, _command: Bytes) -> std::result::Result<Bytes, TransportError> {
            Ok(Bytes::from_static(&[0x90, 0x00]))
        }
    }

    fn tag(family: TagFamily, aid: Option<&'static str>) -> TagHandle {
        Arc::new(StaticTag { family, aid })
    }

    #[test]
    fn test_aid_constant_shape() {
        assert_eq!(ARCULUS_AID.len(), 21);
        assert!(ARCULUS_AID.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_select_first_matching_tag() {
        let validator = TagValidator::default();
        let wanted = tag(TagFamily::Iso7816, Some(ARCULUS_AID));
        let tags = vec![
            tag(TagFamily::Mifare, Some(ARCULUS_AID)),
            tag(TagFamily::Iso7816, Some("A000000003000000")),
            tag(TagFamily::Iso7816, None),
            wanted.clone(),
            tag(TagFamily::Iso7816, Some(ARCULUS_AID)),
        ];

        let selected = validator.select(&tags).unwrap();
        assert!(Arc::ptr_eq(&selected, &wanted));
    }

    #[test]
    fn test_aid_compared_verbatim() {
        let validator = TagValidator::default();
        let lower = ARCULUS_AID.to_lowercase();
        let lower: &'static str = Box::leak(lower.into_boxed_str());

        assert!(validator.select(&[tag(TagFamily::Iso7816, Some(lower))]).is_none());
        assert!(validator.select(&[]).is_none());
    }
}
