//! Skip catalog entries whose target is already on disk.

use crate::assets::MediaAssets;
use crate::codec::Codec;

/// Decision for one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admit(String),
    /// Already satisfied, or the entry has no identifier.
    Skip(Option<String>),
}

/// Apply the dedup rule to a catalog-derived identifier.
///
/// Never consulted for explicitly named identifiers. With `force` every
/// entry that has an identifier is admitted; an entry without one has
/// nothing to dispatch and is always skipped.
pub fn admit(
    cid: Option<&str>,
    codec: Codec,
    force: bool,
    assets: &(impl MediaAssets + ?Sized),
) -> Admission {
    match cid {
        None | Some("") => Admission::Skip(None),
        Some(cid) if !force && assets.is_present(cid, codec) => {
            Admission::Skip(Some(cid.to_string()))
        }
        Some(cid) => Admission::Admit(cid.to_string()),
    }
}
