//! Execution skeletons for the generated method kinds.
//!
//! [`crate::Client::call`] has already traced the call signature and run
//! the location assertion by the time these run; each skeleton performs its
//! delegate action, traces what it did, and reports status. Errors unwind
//! immediately; the delegate is left in whatever state its last completed
//! action produced.

use crate::browser::{FieldMap, FormSelector};
use crate::client::Client;
use crate::diagnostics::dump_map;
use crate::result::{Error, MacroResult};
use crate::spec::{CustomSpec, FetchSpec, FieldValue, FormSpec, LinkSelector, LinkSpec};
use serde_json::Value;
use std::sync::Arc;

/// Render one call argument as a URL atom. Strings are appended verbatim,
/// not re-quoted or escaped.
fn atom(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn run_fetch(client: &mut Client, spec: &FetchSpec, args: &[Value]) -> MacroResult<()> {
    if let Some(label) = &spec.required_param_label {
        if args.is_empty() {
            return Err(Error::Argument {
                message: format!("you must provide a {label}"),
            });
        }
    }

    let mut target = spec.page_url.clone();
    if let Some(arg) = args.first() {
        target.push_str(&atom(arg));
    }

    client.trace(
        &format!("Retrieving the {}: [{}]", spec.page_description, target),
        0,
    );
    client.delegate_mut().get(&target);

    let path = client.delegate().current_location().unwrap_or_default();
    client.trace(
        &format!("Retrieved the {} : [{}]", spec.page_description, path),
        0,
    );
    let _ = client.report_status();
    Ok(())
}

pub(crate) fn run_form(client: &mut Client, spec: &FormSpec, args: &[Value]) -> MacroResult<()> {
    let fields = match &spec.transform_fields {
        Some(transform) => transform(client, args),
        None => FieldMap::new(),
    };

    client.trace(
        &format!("Searching for the {} form", spec.form_description),
        0,
    );

    // Fixed resolver priority: name over id over number.
    let resolver: Option<(FormSelector, FieldValue)> = [
        (FormSelector::Name, &spec.form_name),
        (FormSelector::Id, &spec.form_id),
        (FormSelector::Number, &spec.form_number),
    ]
    .into_iter()
    .find_map(|(selector, value)| value.as_ref().map(|v| (selector, v.clone())));

    let Some((selector, value)) = resolver else {
        // Unreachable through `MacroLibrary::register_form`, which rejects
        // resolver-less specs at registration.
        return Err(Error::Argument {
            message: "must define one of formName, formId, formNumber".to_string(),
        });
    };

    let value = value.resolve(client, args);
    let Some(form) = client.delegate_mut().resolve_form(selector, &value) else {
        return Err(Error::Lookup {
            message: format!("couldn't find a form with {} [{}]", selector.as_str(), value),
        });
    };

    client.delegate_mut().set_fields(&form, &fields);

    let button = spec
        .form_button
        .as_ref()
        .map(|b| b.resolve(client, args));

    client.trace(&format!("Submitting {} form", spec.form_description), 0);
    client.delegate_mut().submit_form(&fields, button.as_deref());
    let _ = client.report_status();
    Ok(())
}

pub(crate) fn run_link(client: &mut Client, spec: &LinkSpec, args: &[Value]) -> MacroResult<()> {
    client.trace(
        &format!("Searching for the {} link", spec.link_description),
        0,
    );

    let criteria = match &spec.selector {
        LinkSelector::Criteria(map) => map.clone(),
        LinkSelector::Transform(transform) => transform(client, args),
    };

    let Some(link) = client.delegate_mut().find_link(&criteria) else {
        return Err(Error::Lookup {
            message: format!("couldn't find a link matching {}", dump_map(&criteria)),
        });
    };

    client.trace(
        &format!("Following {} link: {}", spec.link_description, link.url),
        0,
    );
    client.delegate_mut().get(&link.url);
    let _ = client.report_status();
    Ok(())
}

pub(crate) fn run_custom(client: &mut Client, spec: &CustomSpec, args: &[Value]) -> MacroResult<()> {
    let handler = Arc::clone(&spec.handler);
    // The handler's value is discarded: chaining always yields the client.
    let _ = handler(client, args)?;
    let _ = client.report_status();
    Ok(())
}
