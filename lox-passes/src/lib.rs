//! Static passes over the AST.

pub mod resolve;
