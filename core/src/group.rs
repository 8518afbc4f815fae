//! Grouping of resolved URLs into dispatch actions.
//!
//! Non-dump URLs sharing a handler are batched into one action so a browser
//! opens them in a single invocation. Dump URLs always get an action of their
//! own because each one renders in a separate pager session. Non-dump actions
//! come first, in first-seen handler order, followed by dump actions in their
//! original order; interactive windows open before any pager blocks a
//! terminal.

use std::collections::HashMap;

use crate::types::{EffectiveConfig, ResolvedAction};

/// Composite grouping key for batchable URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    handler_name: String,
    dump: bool,
}

/// Groups `(url, config)` pairs into ordered [`ResolvedAction`]s.
///
/// # Examples
///
/// ```
/// use webalias_core::{EffectiveConfig, group};
///
/// let gui = EffectiveConfig::for_handler("gui1").unwrap();
/// let mut dump = EffectiveConfig::for_handler("term1").unwrap();
/// dump.dump = true;
///
/// let actions = group(vec![
///     ("https://a".to_string(), dump.clone()),
///     ("https://b".to_string(), gui.clone()),
///     ("https://c".to_string(), gui.clone()),
/// ]);
///
/// assert_eq!(actions.len(), 2);
/// assert_eq!(actions[0].urls, vec!["https://b", "https://c"]);
/// assert_eq!(actions[1].urls, vec!["https://a"]);
/// ```
pub fn group(resolved: Vec<(String, EffectiveConfig)>) -> Vec<ResolvedAction> {
    let mut batched: Vec<ResolvedAction> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut dumps: Vec<ResolvedAction> = Vec::new();

    for (url, config) in resolved {
        if config.dump {
            dumps.push(ResolvedAction::new(url, &config));
            continue;
        }
        let key = GroupKey {
            handler_name: config.handler_name.clone(),
            dump: false,
        };
        match index.get(&key) {
            Some(&slot) => batched[slot].urls.push(url),
            None => {
                index.insert(key, batched.len());
                batched.push(ResolvedAction::new(url, &config));
            }
        }
    }

    batched.extend(dumps);
    batched
}
