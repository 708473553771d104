//! Method registration.
//!
//! [`MacroLibrary`] is the keyed registry behind the generated methods: a
//! spec validated once at registration time, stored under its method name,
//! and dispatched by [`crate::Client::call`]. Registering a second spec
//! under the same name silently replaces the first (last write wins).

use crate::result::{Error, MacroResult};
use crate::spec::{CustomSpec, FetchSpec, FormSpec, LinkSpec, MethodSpec};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of generated macro methods, keyed by method name.
#[derive(Debug, Default)]
pub struct MacroLibrary {
    methods: HashMap<String, Arc<MethodSpec>>,
}

impl MacroLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page-fetching method.
    pub fn register_fetch(&mut self, spec: FetchSpec) -> MacroResult<()> {
        require_nonempty("methodName", &spec.method_name)?;
        require_nonempty("pageDescription", &spec.page_description)?;
        require_nonempty("pageUrl", &spec.page_url)?;
        self.insert(MethodSpec::Fetch(spec));
        Ok(())
    }

    /// Register a form method.
    ///
    /// Unlike the other kinds, a form method must always assert its page:
    /// `assertLocation` is a required field here. At least one of the
    /// name/id/number resolvers must also be set; both are checked here
    /// rather than deferred to call time, so a bad spec fails at setup
    /// instead of mid-test.
    pub fn register_form(&mut self, spec: FormSpec) -> MacroResult<()> {
        require_nonempty("methodName", &spec.method_name)?;
        require_nonempty("formDescription", &spec.form_description)?;
        let has_assertion = spec
            .assert_location
            .as_ref()
            .is_some_and(|assertion| !assertion.is_empty());
        if !has_assertion {
            return Err(Error::Config {
                message: "required field assertLocation is missing or empty".to_string(),
            });
        }
        if !spec.has_resolver() {
            return Err(Error::Config {
                message: "must define one of formName, formId, formNumber".to_string(),
            });
        }
        self.insert(MethodSpec::Form(spec));
        Ok(())
    }

    /// Register a link-following method.
    ///
    /// The selector is exactly one of fixed criteria or a per-call
    /// transform by construction. A fixed criteria map is not inspected;
    /// even an empty one reaches `find_link` verbatim, and the delegate
    /// decides what it selects.
    pub fn register_link(&mut self, spec: LinkSpec) -> MacroResult<()> {
        require_nonempty("methodName", &spec.method_name)?;
        require_nonempty("linkDescription", &spec.link_description)?;
        self.insert(MethodSpec::Link(spec));
        Ok(())
    }

    /// Register a custom method.
    pub fn register_custom(&mut self, spec: CustomSpec) -> MacroResult<()> {
        require_nonempty("methodName", &spec.method_name)?;
        self.insert(MethodSpec::Custom(spec));
        Ok(())
    }

    fn insert(&mut self, spec: MethodSpec) {
        let _ = self
            .methods
            .insert(spec.method_name().to_string(), Arc::new(spec));
    }

    /// Look up a registered spec by method name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<MethodSpec>> {
        self.methods.get(name).cloned()
    }

    /// Whether a method is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Names of all registered methods.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    /// Number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the library is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

fn require_nonempty(field: &str, value: &str) -> MacroResult<()> {
    if value.trim().is_empty() {
        return Err(Error::Config {
            message: format!("required field {field} is missing or empty"),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::browser::FieldMap;
    use serde_json::json;

    fn criteria(key: &str, value: &str) -> FieldMap {
        let mut map = FieldMap::new();
        let _ = map.insert(key.to_string(), value.to_string());
        map
    }

    mod fetch_registration_tests {
        use super::*;

        #[test]
        fn test_valid_spec_registers() {
            let mut library = MacroLibrary::new();
            library
                .register_fetch(FetchSpec::new("home", "home page", "http://host/"))
                .unwrap();
            assert!(library.contains("home"));
            assert_eq!(library.len(), 1);
        }

        #[test]
        fn test_missing_required_field_is_config_error() {
            let mut library = MacroLibrary::new();
            let err = library
                .register_fetch(FetchSpec::new("", "home page", "http://host/"))
                .unwrap_err();
            assert!(matches!(err, Error::Config { .. }));
            assert!(err.to_string().contains("methodName"));

            let err = library
                .register_fetch(FetchSpec::new("home", "  ", "http://host/"))
                .unwrap_err();
            assert!(err.to_string().contains("pageDescription"));
        }
    }

    mod form_registration_tests {
        use super::*;

        #[test]
        fn test_no_resolver_is_config_error() {
            let mut library = MacroLibrary::new();
            let err = library
                .register_form(FormSpec::new("login", "login").with_assert_location("/login"))
                .unwrap_err();
            assert!(matches!(err, Error::Config { .. }));
            assert!(err
                .to_string()
                .contains("must define one of formName, formId, formNumber"));
        }

        #[test]
        fn test_missing_assert_location_is_config_error() {
            let mut library = MacroLibrary::new();
            let err = library
                .register_form(FormSpec::new("login", "login").with_form_name("login"))
                .unwrap_err();
            assert!(matches!(err, Error::Config { .. }));
            assert!(err.to_string().contains("assertLocation"));
            assert!(!library.contains("login"));

            // An empty assertion is as good as a missing one.
            let err = library
                .register_form(
                    FormSpec::new("login", "login")
                        .with_form_name("login")
                        .with_assert_location(""),
                )
                .unwrap_err();
            assert!(err.to_string().contains("assertLocation"));
        }

        #[test]
        fn test_multiple_resolvers_are_allowed() {
            let mut library = MacroLibrary::new();
            library
                .register_form(
                    FormSpec::new("login", "login")
                        .with_assert_location("/login")
                        .with_form_name("login")
                        .with_form_id("login-form"),
                )
                .unwrap();
            assert!(library.contains("login"));
        }
    }

    mod link_registration_tests {
        use super::*;

        #[test]
        fn test_empty_criteria_registers() {
            let mut library = MacroLibrary::new();
            library
                .register_link(LinkSpec::with_criteria("next", "next page", FieldMap::new()))
                .unwrap();
            assert!(library.contains("next"));
        }

        #[test]
        fn test_criteria_and_transform_both_register() {
            let mut library = MacroLibrary::new();
            library
                .register_link(LinkSpec::with_criteria(
                    "next",
                    "next page",
                    criteria("text", "Next"),
                ))
                .unwrap();
            library
                .register_link(LinkSpec::with_transform("nth", "numbered page", |_, args| {
                    criteria("text", args.first().and_then(|v| v.as_str()).unwrap_or(""))
                }))
                .unwrap();
            assert_eq!(library.len(), 2);
        }
    }

    mod registry_behavior_tests {
        use super::*;

        #[test]
        fn test_last_write_wins() {
            let mut library = MacroLibrary::new();
            library
                .register_fetch(FetchSpec::new("page", "first page", "http://host/first"))
                .unwrap();
            library
                .register_fetch(FetchSpec::new("page", "second page", "http://host/second"))
                .unwrap();

            assert_eq!(library.len(), 1);
            match library.get("page").unwrap().as_ref() {
                MethodSpec::Fetch(spec) => assert_eq!(spec.page_url, "http://host/second"),
                other => panic!("unexpected spec: {other:?}"),
            }
        }

        #[test]
        fn test_custom_registration() {
            let mut library = MacroLibrary::new();
            library
                .register_custom(CustomSpec::new("ping", |_, _| Ok(json!(null))))
                .unwrap();
            assert_eq!(library.names(), vec!["ping"]);
        }
    }
}
