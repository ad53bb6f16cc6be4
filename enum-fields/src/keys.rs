/// Name-construction helpers for everything synthesized from one accessor.
#[derive(Debug, Clone, Copy)]
pub struct FieldNames<'a> {
    pub accessor: &'a str,
}

impl<'a> FieldNames<'a> {
    pub fn new(accessor: &'a str) -> Self {
        Self { accessor }
    }

    /// Model-level method returning the full metadata mapping, e.g. `statuses`.
    pub fn collection(&self) -> String {
        pluralize(self.accessor)
    }

    pub fn count(&self) -> String {
        format!("{}_count", self.collection())
    }

    pub fn values(&self) -> String {
        format!("{}_values", self.accessor)
    }

    pub fn options(&self) -> String {
        format!("{}_options", self.accessor)
    }

    /// Model-level literal value of one key, e.g. `active_status_value`.
    pub fn value_constant(&self, key: &str) -> String {
        format!("{key}_{}_value", self.accessor)
    }

    pub fn getter(&self) -> String {
        self.accessor.to_string()
    }

    pub fn writer(&self) -> String {
        format!("{}=", self.accessor)
    }

    pub fn metadata(&self) -> String {
        format!("{}_metadata", self.accessor)
    }

    pub fn property(&self, property: &str) -> String {
        format!("{}_{property}", self.accessor)
    }

    pub fn predicate(&self, key: &str) -> String {
        format!("{key}_{}?", self.accessor)
    }

    pub fn scope(&self, key: &str) -> String {
        format!("{key}_{}", self.accessor)
    }
}

/// Registry key for a model: the underscored, namespace-flattened model name.
///
/// `"Admin::User"` becomes `"admin/user"`, `"UserNotification"` becomes `"user_notification"`.
pub fn model_key(name: &str) -> String {
    name.split("::")
        .filter(|segment| !segment.is_empty())
        .map(underscore)
        .collect::<Vec<_>>()
        .join("/")
}

/// Conventional table name for a model, e.g. `"Admin::User"` -> `"admin_users"`.
pub fn table_name(name: &str) -> String {
    pluralize(&model_key(name).replace('/', "_"))
}

/// Converts a CamelCase identifier to snake_case, keeping acronyms together.
pub fn underscore(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|next| next.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                result.push('_');
            }
        }
        if ch == '-' {
            result.push('_');
        } else {
            result.extend(ch.to_lowercase());
        }
    }
    result
}

/// Simple pluralization rules
pub fn pluralize(word: &str) -> String {
    if word.ends_with('s') || word.ends_with('x') || word.ends_with("ch") || word.ends_with("sh") {
        format!("{word}es")
    } else if word.ends_with('y')
        && !word.ends_with("ay")
        && !word.ends_with("ey")
        && !word.ends_with("oy")
        && !word.ends_with("uy")
    {
        format!("{}ies", &word[..word.len() - 1])
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_field_names() {
        let names = FieldNames::new("status");
        assert_eq!(names.collection(), "statuses");
        assert_eq!(names.count(), "statuses_count");
        assert_eq!(names.values(), "status_values");
        assert_eq!(names.options(), "status_options");
        assert_eq!(names.value_constant("active"), "active_status_value");
        assert_eq!(names.writer(), "status=");
        assert_eq!(names.metadata(), "status_metadata");
        assert_eq!(names.property("icon"), "status_icon");
        assert_eq!(names.predicate("active"), "active_status?");
        assert_eq!(names.scope("active"), "active_status");
    }

    #[test]
    fn derives_model_keys() {
        assert_eq!(model_key("User"), "user");
        assert_eq!(model_key("UserNotification"), "user_notification");
        assert_eq!(model_key("Admin::User"), "admin/user");
        assert_eq!(model_key("API::HTTPRequest"), "api/http_request");
        assert_eq!(model_key("Model2Thing"), "model2_thing");
    }

    #[test]
    fn pluralizes_collection_names() {
        assert_eq!(pluralize("sample_column"), "sample_columns");
        assert_eq!(pluralize("record_type"), "record_types");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("box"), "boxes");
    }

    #[test]
    fn derives_table_names() {
        assert_eq!(table_name("Admin::User"), "admin_users");
        assert_eq!(table_name("PolymorphicTestModel"), "polymorphic_test_models");
    }
}
