//! Binding request values into handler fields.

use crate::descriptor::{Kind, Location, ParamDescriptor, Value};
use crate::error::ValidationError;
use crate::parse::{parse_list, parse_value};
use crate::validate::{is_present, raw_value};
use crate::value::Bindable;
use tracing::trace;
use vertex_core::RequestContext;

/// Copies request values into a handler instance.
///
/// Each parameter reads the first value under its name. Lists collect every
/// repeated value and split each on commas, dropping empty parts. Empty
/// values for optional numeric and boolean kinds leave the field untouched
/// so a default can apply. Absent parameters are skipped.
///
/// # Errors
///
/// Returns [`ValidationError::Malformed`] when a value does not parse as its
/// kind, including an empty value sent for a required numeric or boolean
/// parameter. Returns [`ValidationError::Bind`] when the handler rejects a
/// value.
pub fn bind<B: Bindable + ?Sized>(
    instance: &mut B,
    params: &[ParamDescriptor],
    ctx: &RequestContext,
) -> Result<(), ValidationError> {
    for param in params {
        if !is_present(param, ctx) {
            continue;
        }

        let Some(value) = convert(param, ctx)? else {
            continue;
        };

        trace!(param = %param.name(), value = ?value, "binding parameter");
        instance
            .set_field(param.struct_key(), value)
            .map_err(|source| ValidationError::Bind {
                name: param.name().to_string(),
                source,
            })?;
    }
    Ok(())
}

fn convert(param: &ParamDescriptor, ctx: &RequestContext) -> Result<Option<Value>, ValidationError> {
    if param.kind() == Kind::StringList {
        return Ok(Some(Value::List(list_values(param, ctx))));
    }

    let raw = raw_value(param, ctx);
    if raw.is_empty() && !matches!(param.kind(), Kind::String | Kind::Custom) {
        if param.required() {
            return Err(ValidationError::Malformed {
                name: param.name().to_string(),
                value: String::new(),
            });
        }
        return Ok(None);
    }

    parse_value(raw, param.kind())
        .map(Some)
        .ok_or_else(|| ValidationError::Malformed {
            name: param.name().to_string(),
            value: raw.to_string(),
        })
}

fn list_values(param: &ParamDescriptor, ctx: &RequestContext) -> Vec<String> {
    let raw: Vec<&str> = match param.location() {
        Location::Header => ctx
            .headers()
            .get_all(param.name())
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect(),
        _ => ctx
            .form()
            .get_all(param.name())
            .iter()
            .map(String::as_str)
            .collect(),
    };

    raw.into_iter()
        .flat_map(parse_list)
        .filter(|part| !part.is_empty())
        .collect()
}
