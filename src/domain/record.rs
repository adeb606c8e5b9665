//! Opaque record capability
//!
//! The catalog and dispatcher never see concrete resource types. Each
//! CRUD-managed entity exposes primary-key extraction and type identity
//! through this trait and is passed around as `Arc<dyn Record>`.

/// Capability interface implemented by every concrete resource record type
pub trait Record: Send + Sync {
    /// Primary key of this record, as the string form used in routes and
    /// bulk-selection payloads
    fn primary_key(&self) -> String;

    /// Name of the resource type this record belongs to
    fn kind(&self) -> &str;
}
