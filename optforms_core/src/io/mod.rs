//! Module for reading template inputs and writing solve outcomes
pub mod json;
