//! Stacked data / simulation histogram plots in the CMS style.
//!
//! Histograms are read from the files of an input list, grouped by sample
//! (the file's base name), styled from three small config files and drawn
//! as a stack of simulated samples with the observed `Data` overlaid and a
//! data/MC ratio panel underneath.

pub mod cli;
pub mod collect;
pub mod color;
pub mod config;
pub mod error;
pub mod histogram;
pub mod pipeline;
pub mod ratio;
pub mod report;
pub mod stack;
pub mod store;
pub mod visuals;
