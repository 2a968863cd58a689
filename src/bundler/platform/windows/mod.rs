//! Windows distributables: the NSIS installer and the portable archive.

pub mod archive;
pub mod nsis;
