/// Produces surrogate identifiers for migrated records.
///
/// Every call must return a value never returned before during the lifetime of
/// the process.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}
