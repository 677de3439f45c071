use crate::errors::MapperError;
use std::collections::BTreeMap;

/// Number of rotary knobs on the hardware, fixed by the device.
pub const KNOBS_PER_PAGE: usize = 8;

/// Buttons the surface lets a mapping claim. PLAY, STOP and REC are
/// reserved for transport control and never appear here.
pub const MAPPABLE_BUTTONS: [&str; 8] = [
    "LOOP", "METRO", "TEMPO", "IDEAS", "QUANTIZE", "AUTO", "MUTE", "SOLO",
];

/// Built-in surface actions and their spoken/displayed labels.
pub const SPECIAL_ACTIONS: [(&str, &str); 2] = [
    ("@REPORT_PEAK", "Read Track Peak"),
    ("@REPORT_GR", "Read Gain Reduction (GR)"),
];

/// Look up the friendly label for a special-action code, if it's one we know.
pub fn action_label(code: &str) -> Option<&'static str> {
    SPECIAL_ACTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}

/// Returns true if the given name is one of the buttons a mapping may claim.
pub fn is_mappable_button(name: &str) -> bool {
    MAPPABLE_BUTTONS.contains(&name)
}

/// A value the user can put on a control: nothing, a plugin parameter id,
/// or a built-in action code (leading-`@` token). Knobs only ever accept
/// parameter ids; buttons accept all three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    Unassigned,
    Param(u32),
    Action(String),
}

impl Assignment {
    pub fn is_unassigned(&self) -> bool {
        matches!(self, Assignment::Unassigned)
    }
}

/// The three sub-assignments of a single rotary knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Plain,
    Shift,
    Touch,
}

/// One physical knob's assignments. The three slots are independent;
/// setting one never clears another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnobMap {
    pub plain: Option<u32>,
    pub shift: Option<u32>,
    pub touch: Option<u32>,
}

impl KnobMap {
    pub fn get(&self, slot: Slot) -> Option<u32> {
        match slot {
            Slot::Plain => self.plain,
            Slot::Shift => self.shift,
            Slot::Touch => self.touch,
        }
    }

    fn set(&mut self, slot: Slot, value: Option<u32>) {
        match slot {
            Slot::Plain => self.plain = value,
            Slot::Shift => self.shift = value,
            Slot::Touch => self.touch = value,
        }
    }
}

/// A named bank of eight knob assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub name: String,
    pub knobs: [KnobMap; KNOBS_PER_PAGE],
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            knobs: Default::default(),
        }
    }
}

/// Which control a selection refers to. Resolved once at selection time
/// instead of sniffing int-vs-string at assignment time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRef {
    Knob {
        page: usize,
        knob: usize,
        slot: Slot,
    },
    Button(String),
}

/// Direction for page reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// A full mapping for one plugin: its identity, any number of knob pages,
/// the button assignments, and the working parameter table from the most
/// recent dump.
///
/// `params` is a convenience for display only. It is not persisted, and
/// assignments may reference ids it doesn't contain (e.g. right after
/// loading a saved mapping, or after re-dumping a plugin whose parameter
/// list changed). Lookups must tolerate that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub plugin_name: String,
    pub pages: Vec<Page>,
    pub buttons: BTreeMap<String, Assignment>,
    pub params: BTreeMap<u32, String>,
}

impl Default for Mapping {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapping {
    /// A fresh mapping: one empty page, every button unassigned.
    pub fn new() -> Self {
        let buttons = MAPPABLE_BUTTONS
            .iter()
            .map(|name| (name.to_string(), Assignment::Unassigned))
            .collect();

        Self {
            plugin_name: "Unknown Plugin".to_string(),
            pages: vec![Page::new("Page 1")],
            buttons,
            params: BTreeMap::new(),
        }
    }

    /// Append a new empty page and return its index. The default name is
    /// "Page N" for the new page count; renaming or removing pages later
    /// doesn't renumber anything.
    pub fn add_page(&mut self, name: Option<&str>) -> usize {
        let default_name = format!("Page {}", self.pages.len() + 1);
        self.pages.push(Page::new(name.unwrap_or(&default_name)));
        self.pages.len() - 1
    }

    /// Swap a page with its neighbor. Returns false (and changes nothing)
    /// at either end of the list or for an out-of-range index.
    pub fn move_page(&mut self, index: usize, direction: Direction) -> bool {
        if index >= self.pages.len() {
            return false;
        }
        match direction {
            Direction::Up => {
                if index == 0 {
                    return false;
                }
                self.pages.swap(index, index - 1);
            }
            Direction::Down => {
                if index + 1 >= self.pages.len() {
                    return false;
                }
                self.pages.swap(index, index + 1);
            }
        }
        true
    }

    /// Delete a page. Refused when it's the last one, since a mapping always
    /// keeps at least one page.
    pub fn remove_page(&mut self, index: usize) -> bool {
        if self.pages.len() <= 1 || index >= self.pages.len() {
            return false;
        }
        self.pages.remove(index);
        true
    }

    pub fn rename_page(&mut self, index: usize, name: impl Into<String>) {
        if let Some(page) = self.pages.get_mut(index) {
            page.name = name.into();
        }
    }

    /// Put a parameter on a knob slot, or clear it. Action codes are
    /// refused; the surface can't run actions from a rotary.
    pub fn assign_knob(
        &mut self,
        page: usize,
        knob: usize,
        slot: Slot,
        value: Assignment,
    ) -> Result<(), MapperError> {
        let value = match value {
            Assignment::Unassigned => None,
            Assignment::Param(id) => Some(id),
            Assignment::Action(code) => {
                return Err(MapperError::InvalidOperation(format!(
                    "action '{}' cannot be assigned to a knob",
                    code
                )));
            }
        };

        let page = self.pages.get_mut(page).ok_or_else(|| {
            MapperError::InvalidOperation(format!("page index {} out of range", page))
        })?;
        let knob_map = page.knobs.get_mut(knob).ok_or_else(|| {
            MapperError::InvalidOperation(format!("knob index {} out of range", knob))
        })?;

        knob_map.set(slot, value);
        Ok(())
    }

    /// Overwrite a button's assignment. Only names from
    /// [`MAPPABLE_BUTTONS`] are accepted.
    pub fn assign_button(
        &mut self,
        name: &str,
        value: Assignment,
    ) -> Result<(), MapperError> {
        if !is_mappable_button(name) {
            return Err(MapperError::InvalidOperation(format!(
                "'{}' is not a mappable button",
                name
            )));
        }
        self.buttons.insert(name.to_string(), value);
        Ok(())
    }

    /// Assign through a [`ControlRef`], whichever kind of control it names.
    pub fn assign(&mut self, control: &ControlRef, value: Assignment) -> Result<(), MapperError> {
        match control {
            ControlRef::Knob { page, knob, slot } => {
                self.assign_knob(*page, *knob, *slot, value)
            }
            ControlRef::Button(name) => self.assign_button(name, value),
        }
    }

    pub fn button(&self, name: &str) -> Assignment {
        self.buttons
            .get(name)
            .cloned()
            .unwrap_or(Assignment::Unassigned)
    }

    /// Human-readable text for an assignment, tolerating ids that are
    /// missing from the working parameter table.
    pub fn resolve_display_name(&self, value: &Assignment) -> String {
        match value {
            Assignment::Unassigned => "-".to_string(),
            Assignment::Action(code) => action_label(code)
                .map(|label| label.to_string())
                .unwrap_or_else(|| code.clone()),
            Assignment::Param(id) => {
                let name = self.params.get(id).map(String::as_str).unwrap_or("?");
                format!("[{}] {}", id, name)
            }
        }
    }

    /// Fill pages linearly from the parameter table: eight parameters per
    /// page in ascending id order, plain slots only. This mirrors what the
    /// surface falls back to when a plugin has no hand-built mapping, and
    /// gives a new file a sane starting point.
    pub fn auto_map_pages(&mut self) {
        self.pages.clear();
        let ids: Vec<u32> = self.params.keys().copied().collect();

        for (page_idx, chunk) in ids.chunks(KNOBS_PER_PAGE).enumerate() {
            let mut page = Page::new(format!("Page {}", page_idx + 1));
            for (knob_idx, id) in chunk.iter().enumerate() {
                page.knobs[knob_idx].plain = Some(*id);
            }
            self.pages.push(page);
        }

        if self.pages.is_empty() {
            self.pages.push(Page::new("Page 1"));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn a_fresh_mapping_has_exactly_one_page_and_no_assignments() {
        let mapping = Mapping::new();

        assert_eq!(1, mapping.pages.len());
        assert!(mapping
            .pages[0]
            .knobs
            .iter()
            .all(|k| k.plain.is_none() && k.shift.is_none() && k.touch.is_none()));
        assert!(mapping.buttons.values().all(Assignment::is_unassigned));
        assert!(mapping.params.is_empty());
    }

    #[test]
    fn removing_the_last_remaining_page_is_refused() {
        let mut mapping = Mapping::new();

        let removed = mapping.remove_page(0);

        assert_eq!(false, removed);
        assert_eq!(1, mapping.pages.len());
    }

    #[test]
    fn removing_a_page_works_when_more_than_one_remains() {
        let mut mapping = Mapping::new();
        mapping.add_page(None);

        let removed = mapping.remove_page(0);

        assert_eq!(true, removed);
        assert_eq!(1, mapping.pages.len());
        assert_eq!("Page 2", mapping.pages[0].name);
    }

    #[test]
    fn moving_the_first_page_up_is_refused() {
        let mut mapping = Mapping::new();
        mapping.add_page(None);

        let moved = mapping.move_page(0, Direction::Up);

        assert_eq!(false, moved);
        assert_eq!("Page 1", mapping.pages[0].name);
    }

    #[test]
    fn moving_a_page_down_swaps_it_with_its_neighbor() {
        let mut mapping = Mapping::new();
        mapping.add_page(None);

        let moved = mapping.move_page(0, Direction::Down);

        assert_eq!(true, moved);
        assert_eq!("Page 2", mapping.pages[0].name);
        assert_eq!("Page 1", mapping.pages[1].name);
    }

    #[test]
    fn default_page_names_count_up_from_the_current_page_count() {
        let mut mapping = Mapping::new();

        let index = mapping.add_page(None);

        assert_eq!(1, index);
        assert_eq!("Page 2", mapping.pages[1].name);
    }

    #[test]
    fn assigning_an_action_to_a_knob_is_refused_and_changes_nothing() {
        let mut mapping = Mapping::new();
        mapping
            .assign_knob(0, 3, Slot::Plain, Assignment::Param(12))
            .unwrap();

        let result = mapping.assign_knob(
            0,
            3,
            Slot::Plain,
            Assignment::Action("@REPORT_PEAK".to_string()),
        );

        assert!(matches!(result, Err(MapperError::InvalidOperation(_))));
        assert_eq!(Some(12), mapping.pages[0].knobs[3].plain);
    }

    #[test]
    fn knob_slots_are_independent_of_each_other() {
        let mut mapping = Mapping::new();

        mapping.assign_knob(0, 0, Slot::Plain, Assignment::Param(1)).unwrap();
        mapping.assign_knob(0, 0, Slot::Shift, Assignment::Param(2)).unwrap();
        mapping.assign_knob(0, 0, Slot::Touch, Assignment::Param(3)).unwrap();
        mapping.assign_knob(0, 0, Slot::Shift, Assignment::Unassigned).unwrap();

        assert_eq!(Some(1), mapping.pages[0].knobs[0].plain);
        assert_eq!(None, mapping.pages[0].knobs[0].shift);
        assert_eq!(Some(3), mapping.pages[0].knobs[0].touch);
    }

    #[test]
    fn buttons_outside_the_fixed_set_are_refused() {
        let mut mapping = Mapping::new();

        let result = mapping.assign_button("PLAY", Assignment::Param(1));

        assert!(matches!(result, Err(MapperError::InvalidOperation(_))));
        assert!(!mapping.buttons.contains_key("PLAY"));
    }

    #[test]
    fn buttons_accept_params_and_actions_and_overwrite_unconditionally() {
        let mut mapping = Mapping::new();

        mapping.assign_button("MUTE", Assignment::Param(7)).unwrap();
        mapping
            .assign_button("MUTE", Assignment::Action("@REPORT_GR".to_string()))
            .unwrap();

        assert_eq!(
            Assignment::Action("@REPORT_GR".to_string()),
            mapping.button("MUTE")
        );
    }

    #[test]
    fn assigning_through_a_control_ref_dispatches_to_the_right_control() {
        let mut mapping = Mapping::new();
        let knob = ControlRef::Knob {
            page: 0,
            knob: 5,
            slot: Slot::Shift,
        };
        let button = ControlRef::Button("LOOP".to_string());

        mapping.assign(&knob, Assignment::Param(42)).unwrap();
        mapping.assign(&button, Assignment::Param(9)).unwrap();

        assert_eq!(Some(42), mapping.pages[0].knobs[5].shift);
        assert_eq!(Assignment::Param(9), mapping.button("LOOP"));
    }

    #[test]
    fn display_names_substitute_a_placeholder_for_unknown_param_ids() {
        let mut mapping = Mapping::new();
        mapping.params.insert(3, "Threshold".to_string());

        assert_eq!("-", mapping.resolve_display_name(&Assignment::Unassigned));
        assert_eq!(
            "[3] Threshold",
            mapping.resolve_display_name(&Assignment::Param(3))
        );
        assert_eq!(
            "[99] ?",
            mapping.resolve_display_name(&Assignment::Param(99))
        );
        assert_eq!(
            "Read Track Peak",
            mapping.resolve_display_name(&Assignment::Action("@REPORT_PEAK".to_string()))
        );
        assert_eq!(
            "@CUSTOM",
            mapping.resolve_display_name(&Assignment::Action("@CUSTOM".to_string()))
        );
    }

    #[test]
    fn auto_map_fills_eight_params_per_page_in_id_order() {
        let mut mapping = Mapping::new();
        for id in 0..10u32 {
            mapping.params.insert(id, format!("P{}", id));
        }

        mapping.auto_map_pages();

        assert_eq!(2, mapping.pages.len());
        assert_eq!(Some(0), mapping.pages[0].knobs[0].plain);
        assert_eq!(Some(7), mapping.pages[0].knobs[7].plain);
        assert_eq!(Some(8), mapping.pages[1].knobs[0].plain);
        assert_eq!(Some(9), mapping.pages[1].knobs[1].plain);
        assert_eq!(None, mapping.pages[1].knobs[2].plain);
    }

    #[test]
    fn auto_map_with_no_params_still_leaves_one_page() {
        let mut mapping = Mapping::new();

        mapping.auto_map_pages();

        assert_eq!(1, mapping.pages.len());
    }
}
