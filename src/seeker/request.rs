//! Request variants built once at the boundary from optional fields

use crate::error::{SeekerError, SeekerResult};

/// Which app to locate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindRequest {
    ByGuid(String),
    ByName {
        org: String,
        space: String,
        app: String,
    },
}

impl FindRequest {
    /// Accept either a GUID or the full org/space/app triple, never both
    pub fn from_parts(
        guid: Option<&str>,
        org: Option<&str>,
        space: Option<&str>,
        app: Option<&str>,
    ) -> SeekerResult<Self> {
        let guid = non_empty(guid);
        let (org, space, app) = (non_empty(org), non_empty(space), non_empty(app));

        if let Some(guid) = guid {
            if org.is_some() || space.is_some() || app.is_some() {
                return Err(SeekerError::input(
                    "cannot specify both an app GUID and org/space/app names",
                ));
            }
            return Ok(Self::ByGuid(guid.to_string()));
        }

        match (org, space, app) {
            (Some(org), Some(space), Some(app)) => Ok(Self::ByName {
                org: org.to_string(),
                space: space.to_string(),
                app: app.to_string(),
            }),
            (org, space, app) => {
                let mut missing = Vec::new();
                if org.is_none() {
                    missing.push("no org name specified");
                }
                if space.is_none() {
                    missing.push("no space name specified");
                }
                if app.is_none() {
                    missing.push("no app name specified");
                }
                Err(SeekerError::input(missing.join("\n")))
            }
        }
    }
}

/// What to translate between names and GUIDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertRequest {
    ByGuid(String),
    ByOrg(String),
    BySpace {
        org: String,
        space: String,
    },
    ByApp {
        org: String,
        space: String,
        app: String,
    },
}

impl ConvertRequest {
    pub fn from_parts(
        guid: Option<&str>,
        org: Option<&str>,
        space: Option<&str>,
        app: Option<&str>,
    ) -> SeekerResult<Self> {
        let parts = (
            non_empty(guid),
            non_empty(org),
            non_empty(space),
            non_empty(app),
        );
        match parts {
            (Some(guid), None, None, None) => Ok(Self::ByGuid(guid.to_string())),
            (None, Some(org), None, None) => Ok(Self::ByOrg(org.to_string())),
            (None, Some(org), Some(space), None) => Ok(Self::BySpace {
                org: org.to_string(),
                space: space.to_string(),
            }),
            (None, Some(org), Some(space), Some(app)) => Ok(Self::ByApp {
                org: org.to_string(),
                space: space.to_string(),
                app: app.to_string(),
            }),
            _ => Err(SeekerError::input(
                "Invalid combination of convert input arguments",
            )),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_by_guid() {
        assert_eq!(
            FindRequest::from_parts(Some("g"), None, None, None).unwrap(),
            FindRequest::ByGuid("g".to_string())
        );
    }

    #[test]
    fn find_by_names() {
        let req = FindRequest::from_parts(None, Some("o"), Some("s"), Some("a")).unwrap();
        assert!(matches!(req, FindRequest::ByName { ref app, .. } if app == "a"));
    }

    #[test]
    fn find_partial_triple_lists_missing() {
        let err = FindRequest::from_parts(None, Some("o"), None, Some("")).unwrap_err();
        assert!(err.is_input_error());
        assert_eq!(
            err.to_string(),
            "no space name specified\nno app name specified"
        );
    }

    #[test]
    fn find_guid_with_names_rejected() {
        let err = FindRequest::from_parts(Some("g"), Some("o"), None, None).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn convert_variants() {
        assert_eq!(
            ConvertRequest::from_parts(None, Some("o"), None, None).unwrap(),
            ConvertRequest::ByOrg("o".to_string())
        );
        assert!(matches!(
            ConvertRequest::from_parts(None, Some("o"), Some("s"), None).unwrap(),
            ConvertRequest::BySpace { .. }
        ));
        assert!(matches!(
            ConvertRequest::from_parts(None, Some("o"), Some("s"), Some("a")).unwrap(),
            ConvertRequest::ByApp { .. }
        ));
    }

    #[test]
    fn convert_rejects_mixed_or_gapped_input() {
        for parts in [
            (Some("g"), Some("o"), None, None),
            (None, None, Some("s"), None),
            (None, Some("o"), None, Some("a")),
            (None, None, None, None),
        ] {
            let err = ConvertRequest::from_parts(parts.0, parts.1, parts.2, parts.3).unwrap_err();
            assert_eq!(err.to_string(), "Invalid combination of convert input arguments");
        }
    }
}
