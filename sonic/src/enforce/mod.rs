// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Diff an actual [`Spec`] against a desired one into the ordered set of actions that
//! turns the former into the latter.
//!
//! Every entity kind has a [`ValueEnforcer`] describing where it lives in the switch
//! configuration tree and how it is encoded. Collections are diffed key by key with
//! [`enforce_map`]. Hierarchical entities use a custom handler that computes the path of
//! the entity and runs the enforcers of its parts underneath it.

mod action;
mod interfaces;
mod nat;
mod overlay;
mod policy;
mod system;
mod vrfs;

pub use action::{Action, ActionKind, ActionQueue, ActionWeight, CustomAction};

use serde_json::Value;
use spec::{IsEmpty, Spec};
use std::collections::BTreeMap;
use std::fmt::Display;
use thiserror::Error;
use tracing::debug;

use crate::schema::{expand_path, expand_text};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnforcerError {
    #[error("Action '{0}' has invalid weight {1}")]
    InvalidWeight(String, u16),
    #[error("Failed to encode '{0}': {1}")]
    Marshal(String, String),
    #[error("Enforcer of '{0}' has no {1}")]
    Incomplete(String, &'static str),
}

/// Encode a payload, mapping failures to [`EnforcerError::Marshal`]
pub(crate) fn to_value<S: serde::Serialize>(
    summary: &str,
    payload: &S,
) -> Result<Value, EnforcerError> {
    serde_json::to_value(payload)
        .map_err(|e| EnforcerError::Marshal(summary.to_owned(), e.to_string()))
}

pub type MutateFn<K, T> = fn(&K, Option<T>) -> Option<T>;
pub type MarshalFn<K, T> = fn(&K, &T) -> Result<Value, EnforcerError>;
pub type HandlerFn<K, T> =
    fn(&str, &K, Option<&T>, Option<&T>, &mut ActionQueue) -> Result<(), EnforcerError>;

/// How to bring one entity (or one part of an entity) of type `T`, identified by a key
/// of type `K`, from its actual value to its desired one.
pub struct ValueEnforcer<K: 'static, T: 'static> {
    /// human readable description, `%s` standing for the key
    pub summary: &'static str,
    /// path of the entity relative to the base path, `%s` standing for the key
    pub path: &'static str,
    /// computes the relative path instead of `path`
    pub path_fn: Option<fn(&K) -> String>,
    /// path used when the entity doesn't exist yet, if it differs
    pub create_path: Option<&'static str>,
    /// restricts the comparison to the part of the value this enforcer owns
    pub getter: Option<fn(&T) -> T>,
    pub mutate_actual: Option<MutateFn<K, T>>,
    pub mutate_desired: Option<MutateFn<K, T>>,
    /// send changes as updates rather than replacements
    pub no_replace: bool,
    pub marshal: Option<MarshalFn<K, T>>,
    pub update_weight: ActionWeight,
    pub delete_weight: ActionWeight,
    /// takes over handling entirely
    pub custom_handler: Option<HandlerFn<K, T>>,
    pub warning_on_error: bool,
}

impl<K: 'static, T: 'static> ValueEnforcer<K, T> {
    /// Base for struct update syntax
    pub const DEFAULT: Self = Self {
        summary: "",
        path: "",
        path_fn: None,
        create_path: None,
        getter: None,
        mutate_actual: None,
        mutate_desired: None,
        no_replace: false,
        marshal: None,
        update_weight: ActionWeight::Unset,
        delete_weight: ActionWeight::Unset,
        custom_handler: None,
        warning_on_error: false,
    };
}

impl<K: Display + 'static, T: Clone + PartialEq + IsEmpty + 'static> ValueEnforcer<K, T> {
    fn relative_path(&self, key: &K, creating: bool) -> Result<String, EnforcerError> {
        if let (true, Some(create_path)) = (creating, self.create_path) {
            return Ok(expand_path(create_path, &key.to_string()));
        }
        if let Some(path_fn) = self.path_fn {
            return Ok(path_fn(key));
        }
        if self.path.is_empty() {
            return Err(EnforcerError::Incomplete(
                expand_text(self.summary, &key.to_string()),
                "path",
            ));
        }
        Ok(expand_path(self.path, &key.to_string()))
    }

    /// Queue what it takes to turn `actual` into `desired`. Nothing is queued when they
    /// are equal once empty values are collapsed and mutations and getter applied.
    pub fn handle(
        &self,
        basepath: &str,
        key: &K,
        actual: Option<&T>,
        desired: Option<&T>,
        queue: &mut ActionQueue,
    ) -> Result<(), EnforcerError> {
        if let Some(handler) = self.custom_handler {
            return handler(basepath, key, actual, desired, queue);
        }

        let actual = actual.filter(|v| !v.is_empty()).cloned();
        let desired = desired.filter(|v| !v.is_empty()).cloned();
        let actual = match self.mutate_actual {
            Some(mutate) => mutate(key, actual),
            None => actual,
        };
        let desired = match self.mutate_desired {
            Some(mutate) => mutate(key, desired),
            None => desired,
        };
        let project = |value: Option<T>| {
            let value = match self.getter {
                Some(getter) => value.map(|v| getter(&v)),
                None => value,
            };
            value.filter(|v| !v.is_empty())
        };
        let actual = project(actual);
        let desired = project(desired);
        if actual == desired {
            return Ok(());
        }

        let summary = expand_text(self.summary, &key.to_string());
        let Some(desired) = desired else {
            let path = format!("{basepath}{}", self.relative_path(key, false)?);
            debug!("Delete {summary} at {path}");
            return queue.add(Action {
                weight: self.delete_weight,
                summary: format!("Delete {summary}"),
                kind: ActionKind::Delete,
                path,
                value: None,
                custom: None,
                warning_on_error: self.warning_on_error,
            });
        };

        let creating = actual.is_none();
        let kind = if creating || self.no_replace {
            ActionKind::Update
        } else {
            ActionKind::Replace
        };
        let marshal = self
            .marshal
            .ok_or_else(|| EnforcerError::Incomplete(summary.clone(), "marshal function"))?;
        let value = marshal(key, &desired)?;
        let path = format!("{basepath}{}", self.relative_path(key, creating)?);
        debug!("{kind} {summary} at {path}");
        queue.add(Action {
            weight: self.update_weight,
            summary: format!("{} {summary}", if creating { "Create" } else { "Update" }),
            kind,
            path,
            value: Some(value),
            custom: None,
            warning_on_error: self.warning_on_error,
        })
    }
}

/// Diff two collections of entities keyed the same way. Keys only on the actual side
/// are handled first, as deletions.
pub fn enforce_map<K, T>(
    enforcer: &ValueEnforcer<K, T>,
    basepath: &str,
    actual: Option<&BTreeMap<K, T>>,
    desired: Option<&BTreeMap<K, T>>,
    queue: &mut ActionQueue,
) -> Result<(), EnforcerError>
where
    K: Ord + Display + 'static,
    T: Clone + PartialEq + IsEmpty + 'static,
{
    if let Some(actual) = actual {
        for (key, value) in actual {
            if desired.is_none_or(|desired| !desired.contains_key(key)) {
                enforcer.handle(basepath, key, Some(value), None, queue)?;
            }
        }
    }
    if let Some(desired) = desired {
        for (key, value) in desired {
            let current = actual.and_then(|actual| actual.get(key));
            enforcer.handle(basepath, key, current, Some(value), queue)?;
        }
    }
    Ok(())
}

/// Compute the actions turning `actual` into `desired`. Both are expected normalized.
pub fn enforce(actual: &Spec, desired: &Spec) -> Result<ActionQueue, EnforcerError> {
    let mut queue = ActionQueue::new();
    system::enforce(actual, desired, &mut queue)?;
    interfaces::enforce(actual, desired, &mut queue)?;
    overlay::enforce(actual, desired, &mut queue)?;
    policy::enforce(actual, desired, &mut queue)?;
    vrfs::enforce(actual, desired, &mut queue)?;
    nat::enforce(actual, desired, &mut queue)?;
    debug!("Enforcer produced {} actions", queue.len());
    Ok(queue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Entry {
        mtu: Option<u32>,
        description: Option<String>,
    }
    impl IsEmpty for Entry {
        fn is_empty(&self) -> bool {
            self.mtu.is_none() && self.description.is_none()
        }
    }

    fn marshal_entry(_: &String, entry: &Entry) -> Result<Value, EnforcerError> {
        Ok(json!({"mtu": entry.mtu, "description": entry.description}))
    }

    const ENTRIES: ValueEnforcer<String, Entry> = ValueEnforcer {
        summary: "entry %s",
        path: "/entries/entry[name=%s]/config",
        marshal: Some(marshal_entry),
        update_weight: ActionWeight::LldpInterfaceUpdate,
        delete_weight: ActionWeight::LldpInterfaceDelete,
        ..ValueEnforcer::DEFAULT
    };

    fn entry(mtu: u32) -> Entry {
        Entry {
            mtu: Some(mtu),
            description: None,
        }
    }

    fn handle(
        enforcer: &ValueEnforcer<String, Entry>,
        actual: Option<&Entry>,
        desired: Option<&Entry>,
    ) -> Result<Vec<Action>, EnforcerError> {
        let mut queue = ActionQueue::new();
        enforcer.handle("/base", &"e1".to_owned(), actual, desired, &mut queue)?;
        Ok(queue.into_sorted())
    }

    #[test]
    fn test_create_update_delete() {
        let created = handle(&ENTRIES, None, Some(&entry(9100))).unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].kind, ActionKind::Update);
        assert_eq!(created[0].summary, "Create entry e1");
        assert_eq!(created[0].path, "/base/entries/entry[name=e1]/config");
        assert_eq!(created[0].weight, ActionWeight::LldpInterfaceUpdate);
        assert_eq!(
            created[0].value,
            Some(json!({"mtu": 9100, "description": null}))
        );

        let updated = handle(&ENTRIES, Some(&entry(1500)), Some(&entry(9100))).unwrap();
        assert_eq!(updated[0].kind, ActionKind::Replace);
        assert_eq!(updated[0].summary, "Update entry e1");

        let deleted = handle(&ENTRIES, Some(&entry(1500)), None).unwrap();
        assert_eq!(deleted[0].kind, ActionKind::Delete);
        assert_eq!(deleted[0].summary, "Delete entry e1");
        assert_eq!(deleted[0].weight, ActionWeight::LldpInterfaceDelete);
        assert_eq!(deleted[0].value, None);
        assert!(!deleted[0].warning_on_error);
    }

    #[test]
    fn test_equal_or_empty_is_nothing() {
        assert!(handle(&ENTRIES, Some(&entry(1500)), Some(&entry(1500))).unwrap().is_empty());
        assert!(handle(&ENTRIES, Some(&Entry::default()), None).unwrap().is_empty());
        assert!(handle(&ENTRIES, None, Some(&Entry::default())).unwrap().is_empty());
    }

    #[test]
    fn test_create_path() {
        let enforcer = ValueEnforcer {
            create_path: Some("/entries/entry[name=%s]"),
            ..ENTRIES
        };
        let created = handle(&enforcer, None, Some(&entry(9100))).unwrap();
        assert_eq!(created[0].path, "/base/entries/entry[name=e1]");
        let updated = handle(&enforcer, Some(&entry(1500)), Some(&entry(9100))).unwrap();
        assert_eq!(updated[0].path, "/base/entries/entry[name=e1]/config");
        let deleted = handle(&enforcer, Some(&entry(1500)), None).unwrap();
        assert_eq!(deleted[0].path, "/base/entries/entry[name=e1]/config");
    }

    #[test]
    fn test_path_fn() {
        fn by_name(key: &String) -> String {
            format!("/named/{key}")
        }
        let enforcer = ValueEnforcer {
            path: "",
            path_fn: Some(by_name),
            ..ENTRIES
        };
        let created = handle(&enforcer, None, Some(&entry(9100))).unwrap();
        assert_eq!(created[0].path, "/base/named/e1");
    }

    #[test]
    fn test_no_replace() {
        let enforcer = ValueEnforcer {
            no_replace: true,
            ..ENTRIES
        };
        let updated = handle(&enforcer, Some(&entry(1500)), Some(&entry(9100))).unwrap();
        assert_eq!(updated[0].kind, ActionKind::Update);
        assert_eq!(updated[0].summary, "Update entry e1");
        let deleted = handle(&enforcer, Some(&entry(1500)), None).unwrap();
        assert_eq!(deleted[0].kind, ActionKind::Delete);
    }

    #[test]
    fn test_mutations() {
        /* the switch reports a default MTU nobody asked for */
        fn drop_default_mtu(_: &String, entry: Option<Entry>) -> Option<Entry> {
            entry.map(|mut e| {
                if e.mtu == Some(9100) {
                    e.mtu = None;
                }
                e
            })
        }
        let enforcer = ValueEnforcer {
            mutate_actual: Some(drop_default_mtu),
            ..ENTRIES
        };
        assert!(handle(&enforcer, Some(&entry(9100)), None).unwrap().is_empty());
        let deleted = handle(&enforcer, Some(&entry(1500)), None).unwrap();
        assert_eq!(deleted[0].kind, ActionKind::Delete);

        let enforcer = ValueEnforcer {
            mutate_desired: Some(drop_default_mtu),
            ..ENTRIES
        };
        assert!(handle(&enforcer, None, Some(&entry(9100))).unwrap().is_empty());
    }

    #[test]
    fn test_getter() {
        fn mtu_only(entry: &Entry) -> Entry {
            Entry {
                mtu: entry.mtu,
                description: None,
            }
        }
        let enforcer = ValueEnforcer {
            getter: Some(mtu_only),
            ..ENTRIES
        };
        let described = Entry {
            mtu: Some(1500),
            description: Some("uplink".to_owned()),
        };
        assert!(handle(&enforcer, Some(&entry(1500)), Some(&described)).unwrap().is_empty());
        let updated = handle(&enforcer, Some(&described), Some(&entry(9100))).unwrap();
        assert_eq!(
            updated[0].value,
            Some(json!({"mtu": 9100, "description": null}))
        );
    }

    #[test]
    fn test_warning_on_error() {
        let enforcer = ValueEnforcer {
            warning_on_error: true,
            ..ENTRIES
        };
        assert!(handle(&enforcer, None, Some(&entry(9100))).unwrap()[0].warning_on_error);
        assert!(handle(&enforcer, Some(&entry(9100)), None).unwrap()[0].warning_on_error);
    }

    #[test]
    fn test_custom_handler() {
        fn count(
            basepath: &str,
            key: &String,
            _: Option<&Entry>,
            _: Option<&Entry>,
            queue: &mut ActionQueue,
        ) -> Result<(), EnforcerError> {
            queue.add(Action {
                weight: ActionWeight::LldpInterfaceUpdate,
                summary: format!("Custom {key}"),
                kind: ActionKind::Update,
                path: format!("{basepath}/custom"),
                value: Some(json!({})),
                custom: None,
                warning_on_error: false,
            })
        }
        let enforcer = ValueEnforcer {
            custom_handler: Some(count),
            ..ENTRIES
        };
        /* the handler runs even when both sides are equal */
        let actions = handle(&enforcer, Some(&entry(1)), Some(&entry(1))).unwrap();
        assert_eq!(actions[0].path, "/base/custom");
    }

    #[test]
    fn test_incomplete_enforcers() {
        let no_path = ValueEnforcer {
            path: "",
            ..ENTRIES
        };
        assert_eq!(
            handle(&no_path, None, Some(&entry(9100))).unwrap_err(),
            EnforcerError::Incomplete("entry e1".to_owned(), "path")
        );
        assert_eq!(
            handle(&no_path, Some(&entry(9100)), None).unwrap_err(),
            EnforcerError::Incomplete("entry e1".to_owned(), "path")
        );

        let no_marshal = ValueEnforcer {
            marshal: None,
            ..ENTRIES
        };
        assert_eq!(
            handle(&no_marshal, None, Some(&entry(9100))).unwrap_err(),
            EnforcerError::Incomplete("entry e1".to_owned(), "marshal function")
        );
        /* deletions carry no payload */
        assert!(handle(&no_marshal, Some(&entry(9100)), None).is_ok());

        let unweighted = ValueEnforcer {
            update_weight: ActionWeight::Unset,
            ..ENTRIES
        };
        assert_eq!(
            handle(&unweighted, None, Some(&entry(9100))).unwrap_err(),
            EnforcerError::InvalidWeight("Create entry e1".to_owned(), 0)
        );
    }

    #[test]
    fn test_enforce_map() {
        let actual = BTreeMap::from([
            ("a".to_owned(), entry(1500)),
            ("b".to_owned(), entry(1500)),
        ]);
        let desired = BTreeMap::from([
            ("b".to_owned(), entry(9100)),
            ("c".to_owned(), entry(1500)),
        ]);
        let mut queue = ActionQueue::new();
        enforce_map(&ENTRIES, "", Some(&actual), Some(&desired), &mut queue).unwrap();
        let summaries: Vec<&str> = queue.actions().iter().map(|a| a.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec!["Delete entry a", "Update entry b", "Create entry c"]
        );

        let mut queue = ActionQueue::new();
        enforce_map(&ENTRIES, "", Some(&actual), None, &mut queue).unwrap();
        assert_eq!(queue.len(), 2);
        assert!(queue.actions().iter().all(|a| a.kind == ActionKind::Delete));
    }
}
