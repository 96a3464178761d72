//! Project plans (tasks, phases, milestones, resources, risks).

use super::{parse_raw, Parsed};
use crate::artifact::RawContent;
use crate::constants::PLAN_NOTES_KEY;
use crate::content::{PlanContent, PLAN_LIST_KEYS};
use serde_json::Value;

/// Normalizes plan content.
///
/// Each of the five lists is taken when present as a list and empty otherwise; other keys are
/// kept. A top-level list is read as the task list, and free text is kept under `notes`.
pub fn normalize_plan(raw: &RawContent) -> PlanContent {
    let mut plan = PlanContent::default();
    match parse_raw(raw) {
        Parsed::Text(text) => {
            if !text.trim().is_empty() {
                plan.extra.insert(PLAN_NOTES_KEY.into(), Value::String(text));
            }
        }
        Parsed::Array(items) => plan.tasks = items,
        Parsed::Object(mut map) => {
            for key in PLAN_LIST_KEYS {
                if let Some(Value::Array(items)) = map.remove(key) {
                    if let Some(list) = plan.list_mut(key) {
                        *list = items;
                    }
                }
            }
            plan.extra = map;
        }
    }
    plan
}
