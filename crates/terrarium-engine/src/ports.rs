//! Imagery platform port
//!
//! Every remote-calling component goes through this trait, so tests can
//! substitute an in-process platform for the Earth Engine client.

use serde_json::Value;

use terrarium_core::error::Result;

use crate::export::ExportRequest;
use crate::expression::Expr;

/// Port for a remote imagery analysis platform
pub trait ImageryPlatform: Send + Sync {
    /// Evaluate an expression remotely and return its value
    ///
    /// # Arguments
    /// * `expression` - The expression graph to evaluate
    ///
    /// # Returns
    /// The computed value as JSON
    fn compute_value(&self, expression: &Expr) -> Result<Value>;

    /// Submit a cloud-storage export and return the operation payload
    fn start_export(&self, request: &ExportRequest) -> Result<Value>;

    /// Fetch the current payload of a long-running operation
    ///
    /// # Arguments
    /// * `name` - Operation name, `projects/{project}/operations/{task}`
    fn get_operation(&self, name: &str) -> Result<Value>;
}
