//! GraphQL schema definitions for atrium.
//!
//! The generated schema types live in their own crate so that edits to the
//! view engine do not force the schema module to be regenerated.

// Generated code
#![allow(clippy::all)]
#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]

/// ERP GraphQL schema types (customers and companies).
///
/// Generated from `schemas/erp.graphql`; imported as `schema` by the query
/// fragments in `atrium::remote`.
#[cynic::schema("erp")]
pub mod erp {}
