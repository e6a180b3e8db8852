//! Results table: headings, rows and answer feedback marks

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlInputElement};

use crate::platform::dom;
use crate::sim::{AnswerState, LabMode, ResultsTable, Side, TableRow, headings};

const TBODY_SELECTOR: &str = ".data-table table tbody";
const HEADING_SELECTOR: &str = ".data-table table thead th";

pub struct TableView {
    tbody: Element,
}

impl TableView {
    pub fn find() -> Option<Self> {
        Some(Self {
            tbody: dom::query(TBODY_SELECTOR)?,
        })
    }

    pub fn body(&self) -> &Element {
        &self.tbody
    }

    /// Rebuild every row. Student entries are discarded.
    pub fn render(&self, table: &ResultsTable) {
        self.tbody.set_inner_html("");
        for (index, row) in table.rows.iter().enumerate() {
            if let Some(tr) = build_row(index, row) {
                let _ = self.tbody.append_child(&tr);
            }
        }
    }

    /// Row index of an input inside the table
    pub fn row_of(&self, input: &Element) -> Option<usize> {
        input
            .closest("tr[data-row]")
            .ok()
            .flatten()?
            .get_attribute("data-row")?
            .parse()
            .ok()
    }

    /// (distance text, moment input) for a rendered row
    pub fn entries(&self, row: usize) -> Option<(String, HtmlInputElement)> {
        let tr = self
            .tbody
            .query_selector(&format!("tr[data-row=\"{row}\"]"))
            .ok()
            .flatten()?;
        let distance = find_input(&tr, ".distance-input")
            .map(|i| i.value())
            .unwrap_or_default();
        let moment = find_input(&tr, ".moment-input")?;
        Some((distance, moment))
    }

    /// Re-run validation for every row
    pub fn validate_all(&self, rows: usize, mut check: impl FnMut(usize, &str, &str) -> AnswerState) {
        for row in 0..rows {
            if let Some((distance, moment)) = self.entries(row) {
                let state = check(row, &distance, &moment.value());
                set_feedback(&moment, state);
            }
        }
    }
}

/// Column titles for the mode; tables with an unexpected shape are left alone
pub fn update_headings(mode: LabMode) {
    let cells = dom::query_all(HEADING_SELECTOR);
    for (index, text) in headings(mode, cells.len()) {
        if let Some(cell) = cells.get(index) {
            cell.set_text_content(Some(text));
        }
    }
}

/// Show a ✓/✗ mark beside an input and tint the input
pub fn set_feedback(input: &HtmlInputElement, state: AnswerState) {
    let Some(cell) = input.parent_element() else {
        return;
    };
    let mark = match cell.query_selector(".feedback-mark").ok().flatten() {
        Some(mark) => mark,
        None => {
            let Some(mark) = dom::create("span", "feedback-mark") else {
                return;
            };
            let _ = cell.append_child(&mark);
            mark.into()
        }
    };

    let _ = input.class_list().remove_2("answer-correct", "answer-incorrect");
    let _ = mark.class_list().remove_2("correct", "incorrect");
    mark.set_text_content(Some(state.mark()));
    if let Some((input_class, mark_class)) = state.classes() {
        let _ = input.class_list().add_1(input_class);
        let _ = mark.class_list().add_1(mark_class);
    }
}

fn build_row(index: usize, row: &TableRow) -> Option<HtmlElement> {
    let tr = dom::create("tr", "")?;
    let _ = tr.set_attribute("data-row", &index.to_string());

    match row {
        TableRow::Aggregate {
            side, total_force, ..
        } => {
            let prefix = id_prefix(*side);
            append_cell(&tr, &format!("<strong>{}</strong>", side.as_str()))?;

            let force = number_input("", Some(&format!("{prefix}TotalMass")))?;
            force.set_min("0");
            force.set_value(&total_force.to_string());
            force.set_read_only(true);
            append_input(&tr, &force)?;

            let distance = number_input("distance-input", Some(&format!("{prefix}Distance")))?;
            distance.set_min("0");
            distance.set_max("12");
            distance.set_value("0");
            append_input(&tr, &distance)?;

            let moment = number_input("moment-input", Some(&format!("{prefix}Moment")))?;
            moment.set_placeholder("Calculate yourself");
            append_input(&tr, &moment)?;
        }
        TableRow::PerMass {
            mass_id,
            side,
            position,
            force,
        } => {
            append_cell(&tr, &format!("<strong>{}</strong> ({position})", side.as_str()))?;

            let force_cell = number_input("force-cell", None)?;
            force_cell.set_value(&force.to_string());
            force_cell.set_read_only(true);
            append_input(&tr, &force_cell)?;

            let distance = number_input("distance-input", None)?;
            distance.set_min("0");
            distance.set_step("any");
            let _ = distance.set_attribute("data-mass-id", &mass_id.to_string());
            append_input(&tr, &distance)?;

            let moment = number_input("moment-input", None)?;
            let _ = moment.set_attribute("data-mass-id", &mass_id.to_string());
            append_input(&tr, &moment)?;
        }
    }
    Some(tr)
}

fn id_prefix(side: Side) -> &'static str {
    match side {
        Side::Right => "right",
        _ => "left",
    }
}

fn number_input(class: &str, id: Option<&str>) -> Option<HtmlInputElement> {
    let input: HtmlInputElement = dom::create("input", class)?.dyn_into().ok()?;
    input.set_type("number");
    if let Some(id) = id {
        input.set_id(id);
    }
    Some(input)
}

fn append_cell(tr: &HtmlElement, html: &str) -> Option<()> {
    let td = dom::create("td", "")?;
    td.set_inner_html(html);
    tr.append_child(&td).ok()?;
    Some(())
}

fn append_input(tr: &HtmlElement, input: &HtmlInputElement) -> Option<()> {
    let td = dom::create("td", "")?;
    td.append_child(input).ok()?;
    tr.append_child(&td).ok()?;
    Some(())
}

fn find_input(parent: &Element, selector: &str) -> Option<HtmlInputElement> {
    parent.query_selector(selector).ok().flatten()?.dyn_into().ok()
}
