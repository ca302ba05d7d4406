//! Schema extraction: from an [`InputShape`] to parameter descriptors.

use crate::descriptor::{Kind, ParamDescriptor};
use crate::error::SchemaError;
use crate::parse::parse_default;
use crate::shape::{FieldDecl, FieldType, InputShape, IGNORE_KEY};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, error, warn};

/// The documented view of a handler: its path, description and parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestInfo {
    /// The route path.
    pub path: String,
    /// Human readable description.
    pub description: String,
    /// The handler's parameters.
    pub params: Vec<ParamDescriptor>,
}

/// Extracts the parameter descriptors of a handler shape.
///
/// Embedded groups are flattened depth-first. When names collide, the
/// innermost declaration wins and later duplicates are dropped. Fields of
/// unsupported types are skipped with a warning.
///
/// # Errors
///
/// Returns [`SchemaError::UnsupportedShape`] for shapes that are neither
/// struct-like nor function-like.
pub fn extract(shape: &InputShape) -> Result<Vec<ParamDescriptor>, SchemaError> {
    match shape {
        InputShape::Struct(fields) => Ok(dedupe(extract_fields(fields))),
        InputShape::Function => Ok(Vec::new()),
        InputShape::Unsupported(type_name) => Err(SchemaError::UnsupportedShape {
            type_name: type_name.clone(),
        }),
    }
}

/// Extracts the documented request info of a handler.
///
/// An empty `description` falls back to the doc of the `_` marker field.
///
/// # Errors
///
/// Same as [`extract`].
pub fn extract_request_info(
    path: &str,
    description: &str,
    shape: &InputShape,
) -> Result<RequestInfo, SchemaError> {
    let params = extract(shape)?;

    let description = if description.is_empty() {
        marker_description(shape).unwrap_or_default()
    } else {
        description.to_string()
    };

    Ok(RequestInfo {
        path: path.to_string(),
        description,
        params,
    })
}

fn marker_description(shape: &InputShape) -> Option<String> {
    let InputShape::Struct(fields) = shape else {
        return None;
    };
    fields
        .iter()
        .find(|f| f.struct_key == IGNORE_KEY && !f.description.is_empty())
        .map(|f| f.description.clone())
}

fn extract_fields(fields: &[FieldDecl]) -> Vec<ParamDescriptor> {
    let mut ret = Vec::with_capacity(fields.len());

    for field in fields {
        if field.struct_key == IGNORE_KEY {
            continue;
        }

        match &field.ty {
            FieldType::Group(inner) => {
                let mut nested = extract_fields(inner);
                nested.append(&mut ret);
                ret = nested;
            }
            FieldType::Leaf(kind) => ret.push(descriptor(field, *kind)),
            FieldType::Decoded => ret.push(descriptor(field, Kind::Custom)),
            FieldType::Unknown(type_name) => {
                warn!(
                    field = %field.struct_key,
                    type_name = %type_name,
                    "skipping field of unsupported type"
                );
            }
        }
    }

    ret
}

fn dedupe(params: Vec<ParamDescriptor>) -> Vec<ParamDescriptor> {
    let mut seen = HashSet::with_capacity(params.len());
    params
        .into_iter()
        .filter(|p| {
            let first = seen.insert(p.name.clone());
            if !first {
                debug!(param = %p.name, "dropping shadowed parameter");
            }
            first
        })
        .collect()
}

fn descriptor(field: &FieldDecl, kind: Kind) -> ParamDescriptor {
    let name = field
        .name
        .clone()
        .unwrap_or_else(|| field.struct_key.clone());

    let default = parse_default(&field.raw_default, kind);
    if default.is_none() && !field.raw_default.is_empty() {
        error!(
            param = %name,
            kind = %kind,
            default = %field.raw_default,
            "could not parse default value"
        );
    }

    ParamDescriptor {
        name,
        struct_key: field.struct_key.clone(),
        kind,
        required: field.required,
        default,
        raw_default: field.raw_default.clone(),
        min: field.min,
        max: field.max,
        min_length: field.min_length,
        max_length: field.max_length,
        pattern: field.pattern.clone(),
        location: field.location,
        description: field.description.clone(),
        format: field.format.clone(),
        options: field.options.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Location, Value};
    use proptest::prelude::*;

    fn user_shape() -> InputShape {
        InputShape::fields([
            FieldDecl::ignored("Fetch a user"),
            FieldDecl::string("Id").rename("id").required().in_path(),
            FieldDecl::int("Limit").rename("limit").default("10").min(1.0),
            FieldDecl::unknown("Conn", "net.Conn"),
        ])
    }

    #[test]
    fn test_extract_struct() {
        let params = extract(&user_shape()).unwrap();
        assert_eq!(params.len(), 2);

        assert_eq!(params[0].name(), "id");
        assert_eq!(params[0].struct_key(), "Id");
        assert!(params[0].required());
        assert_eq!(params[0].location(), Location::Path);

        assert_eq!(params[1].name(), "limit");
        assert_eq!(params[1].default_value(), Some(&Value::Int(10)));
        assert_eq!(params[1].min(), Some(1.0));
    }

    #[test]
    fn test_name_defaults_to_struct_key() {
        let params = extract(&InputShape::fields([FieldDecl::bool("Verbose")])).unwrap();
        assert_eq!(params[0].name(), "Verbose");
    }

    #[test]
    fn test_function_shape_is_empty() {
        assert!(extract(&InputShape::Function).unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_shape_fails() {
        let err = extract(&InputShape::Unsupported("i32".to_string())).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnsupportedShape {
                type_name: "i32".to_string()
            }
        );
    }

    #[test]
    fn test_inner_group_shadows_outer() {
        let shape = InputShape::fields([
            FieldDecl::string("Name").rename("name").doc("outer"),
            FieldDecl::group(
                "Paging",
                [
                    FieldDecl::string("Name").rename("name").doc("inner"),
                    FieldDecl::int("Page").rename("page"),
                ],
            ),
        ]);

        let params = extract(&shape).unwrap();
        let names: Vec<_> = params.iter().map(ParamDescriptor::name).collect();
        assert_eq!(names, vec!["name", "page"]);
        assert_eq!(params[0].description(), "inner");
    }

    #[test]
    fn test_bad_default_is_dropped() {
        let shape = InputShape::fields([FieldDecl::int("N").default("many")]);
        let params = extract(&shape).unwrap();
        assert!(!params[0].has_default());
        assert_eq!(params[0].raw_default(), "many");
    }

    #[test]
    fn test_decoded_field_is_custom() {
        let shape = InputShape::fields([FieldDecl::decoded("When").rename("when")]);
        assert_eq!(extract(&shape).unwrap()[0].kind(), Kind::Custom);
    }

    #[test]
    fn test_request_info_description() {
        let info = extract_request_info("/users/{id}", "", &user_shape()).unwrap();
        assert_eq!(info.description, "Fetch a user");
        assert_eq!(info.params.len(), 2);

        let info = extract_request_info("/users/{id}", "explicit", &user_shape()).unwrap();
        assert_eq!(info.description, "explicit");
    }

    proptest! {
        #[test]
        fn prop_extract_is_deterministic(names in proptest::collection::vec("[a-c]{1,2}", 0..8)) {
            let shape = InputShape::fields(names.iter().map(|n| FieldDecl::string(n.clone())));
            let first = extract(&shape).unwrap();
            let second = extract(&shape).unwrap();
            prop_assert_eq!(&first, &second);

            let unique: HashSet<_> = first.iter().map(|p| p.name().to_string()).collect();
            prop_assert_eq!(unique.len(), first.len());
        }
    }
}
