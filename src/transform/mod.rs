//! Transform adapters from upstream API shapes into drug profile values.

pub(crate) mod adverse_event;
pub(crate) mod drug;
