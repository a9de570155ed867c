//! NCD CLI - batch drivers and result output for the `ncdmatch` and
//! `freqrank` binaries

pub mod output;
pub mod pipeline;
