use chrono::NaiveDate;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::filter::FilterPatch;
use crate::domain::user::{
    CREATED_FROM_FILTER, CREATED_TO_FILTER, HUB_FILTER, ROLE_FILTER, SEARCH_FILTER, STATUS_FILTER,
};

#[derive(Debug, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_created_range"))]
/// Filter controls submitted from the users table toolbar.
pub struct UserFilterForm {
    /// Free-text search over names and emails.
    #[validate(length(max = 128))]
    pub search: Option<String>,
    /// `all`, `active`, `blocked` or `pending`.
    pub status: Option<String>,
    /// `all`, `admin`, `manager` or `member`.
    pub role: Option<String>,
    #[validate(range(min = 1))]
    pub hub_id: Option<i32>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

fn validate_created_range(form: &UserFilterForm) -> Result<(), ValidationError> {
    match (form.created_from, form.created_to) {
        (Some(from), Some(to)) if from > to => {
            let mut err = ValidationError::new("date_range");
            err.message = Some("Start date must not be later than end date".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

impl UserFilterForm {
    /// Every control of the form is written, so an empty control clears its
    /// filter.
    pub fn to_patch(&self) -> FilterPatch {
        FilterPatch::new()
            .maybe(SEARCH_FILTER, self.search.clone())
            .maybe(STATUS_FILTER, self.status.clone())
            .maybe(ROLE_FILTER, self.role.clone())
            .maybe(HUB_FILTER, self.hub_id)
            .maybe(CREATED_FROM_FILTER, self.created_from)
            .maybe(CREATED_TO_FILTER, self.created_to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::{FilterCriteria, FilterValue};
    use crate::domain::user::users_filter_schema;

    #[test]
    fn test_empty_fields_deserialize_to_none() {
        let form: UserFilterForm =
            serde_html_form::from_str("search=&status=active&hub_id=&created_from=").unwrap();

        assert_eq!(form.search, None);
        assert_eq!(form.status.as_deref(), Some("active"));
        assert_eq!(form.hub_id, None);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_inverted_range_fails_validation() {
        let form: UserFilterForm =
            serde_html_form::from_str("created_from=2024-05-01&created_to=2024-01-01").unwrap();

        assert!(form.validate().is_err());
    }

    #[test]
    fn test_non_positive_hub_fails_validation() {
        let form = UserFilterForm {
            hub_id: Some(0),
            ..UserFilterForm::default()
        };

        assert!(form.validate().is_err());
    }

    #[test]
    fn test_form_to_criteria() {
        let form = UserFilterForm {
            search: Some("  ann ".to_string()),
            status: Some("all".to_string()),
            role: Some("admin".to_string()),
            ..UserFilterForm::default()
        };

        let criteria = users_filter_schema()
            .apply(&FilterCriteria::default(), &form.to_patch())
            .unwrap();

        assert_eq!(criteria.get(SEARCH_FILTER), Some(&FilterValue::Text("ann".into())));
        assert_eq!(criteria.get(STATUS_FILTER), None);
        assert_eq!(criteria.get(ROLE_FILTER), Some(&FilterValue::Text("admin".into())));
    }
}
