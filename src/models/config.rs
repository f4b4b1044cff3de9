//! Configuration model loaded from external sources.

use serde::Deserialize;

use crate::domain::types::{PageSize, TypeConstraintError};

fn default_page_size() -> PageSize {
    PageSize::new(20).unwrap_or(PageSize::MIN)
}

fn max_page_size() -> PageSize {
    PageSize::new(100).unwrap_or(PageSize::MIN)
}

/// Page sizing shared by every list view.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct ListSettings {
    #[serde(default = "default_page_size")]
    pub default_page_size: PageSize,
    #[serde(default = "max_page_size")]
    pub max_page_size: PageSize,
}

impl ListSettings {
    pub fn new(
        default_page_size: PageSize,
        max_page_size: PageSize,
    ) -> Result<Self, TypeConstraintError> {
        let settings = Self {
            default_page_size,
            max_page_size,
        };
        settings.check()?;
        Ok(settings)
    }

    /// Ensures the default page size does not exceed the maximum.
    pub fn check(&self) -> Result<(), TypeConstraintError> {
        if self.default_page_size > self.max_page_size {
            return Err(TypeConstraintError::InvalidValue(format!(
                "default page size {} exceeds maximum {}",
                self.default_page_size, self.max_page_size
            )));
        }
        Ok(())
    }

    /// Caps `size` at the configured maximum.
    pub fn clamp(&self, size: PageSize) -> PageSize {
        size.min(self.max_page_size)
    }
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: max_page_size(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// CSV file the users directory is seeded from.
    pub users_csv: String,
    #[serde(default)]
    pub list: ListSettings,
}
