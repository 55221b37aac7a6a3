use std::fmt::{Display, Formatter};

use crate::controller::{Candidate, Phase, Resolution, SearchController, MIN_RESULT_QUERY_LEN};
use crate::model::{EntityFilter, ResultEntry};
use crate::ranking::{date_sort_available, SortKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub index: usize,
    pub kind: String,
    pub title: String,
    pub subtitle: String,
    pub highlighted: bool,
    pub favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterBar {
    pub entity: EntityFilter,
    pub sort: SortKey,
    pub entity_options: Vec<EntityFilter>,
    pub sort_options: Vec<SortKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub placeholder: String,
    pub query: String,
    pub open: bool,
    pub sections: Vec<Section>,
    pub status: Option<String>,
    pub filters: Option<FilterBar>,
    pub user_role: Option<String>,
}

impl PanelView {
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.sections.iter().flat_map(|section| section.rows.iter())
    }

    pub fn highlighted_row(&self) -> Option<&Row> {
        self.rows().find(|row| row.highlighted)
    }
}

impl SearchController {
    pub fn view(&self) -> PanelView {
        self.view_with_placeholder("")
    }

    pub fn view_with_placeholder(&self, placeholder: &str) -> PanelView {
        let highlighted = self.highlighted();
        let mut history_rows = Vec::new();
        let mut suggestion_rows = Vec::new();
        let mut result_rows = Vec::new();

        for (index, candidate) in self.candidates().into_iter().enumerate() {
            let highlighted = highlighted == Some(index);
            match candidate {
                Candidate::History(term) => history_rows.push(Row {
                    index,
                    kind: "history".to_string(),
                    title: term.to_string(),
                    subtitle: String::new(),
                    highlighted,
                    favorite: false,
                }),
                Candidate::Suggestion(entry) => suggestion_rows.push(Row {
                    index,
                    kind: entry.kind.label().to_string(),
                    title: entry.text.clone(),
                    subtitle: suggestion_subtitle(entry.category.as_deref(), entry.count),
                    highlighted,
                    favorite: false,
                }),
                Candidate::Result(entry) => result_rows.push(Row {
                    index,
                    kind: entry.entity_type.as_str().to_string(),
                    title: entry.title.clone(),
                    subtitle: result_subtitle(entry),
                    highlighted,
                    favorite: entry.is_favorite,
                }),
            }
        }

        let sections = [
            ("Recent searches", history_rows),
            ("Suggestions", suggestion_rows),
            ("Results", result_rows),
        ]
        .into_iter()
        .filter(|(_, rows)| !rows.is_empty())
        .map(|(title, rows)| Section { title, rows })
        .collect();

        let filters = self.settings().show_filters.then(|| FilterBar {
            entity: self.effective_filter(),
            sort: self.filters().sort,
            entity_options: EntityFilter::options(),
            sort_options: sort_options(self.results()),
        });

        PanelView {
            placeholder: placeholder.to_string(),
            query: self.query().to_string(),
            open: self.is_open(),
            sections,
            status: self.status_text(),
            filters,
            user_role: self.user_role().map(str::to_string),
        }
    }

    fn status_text(&self) -> Option<String> {
        if !self.is_open() {
            return None;
        }
        let query = self.parsed_query().free_text.as_str();
        match self.phase() {
            Phase::Idle => None,
            Phase::Suggesting => Some(format!(
                "Type at least {MIN_RESULT_QUERY_LEN} characters to search."
            )),
            Phase::Pending | Phase::Searching => Some("Searching...".to_string()),
            Phase::Resolved(Resolution::HasResults) => None,
            Phase::Resolved(Resolution::NoResults) => Some(format!(
                "No results for '{query}'. Try a broader query."
            )),
            Phase::Error => Some("Search is unavailable right now. Try again shortly.".to_string()),
        }
    }
}

fn sort_options(results: &[ResultEntry]) -> Vec<SortKey> {
    SortKey::ALL
        .into_iter()
        .filter(|key| *key != SortKey::Date || date_sort_available(results))
        .collect()
}

fn suggestion_subtitle(category: Option<&str>, count: Option<u32>) -> String {
    match (category, count) {
        (Some(category), Some(count)) => format!("{category} · {count} results"),
        (Some(category), None) => category.to_string(),
        (None, Some(count)) => format!("{count} results"),
        (None, None) => String::new(),
    }
}

fn result_subtitle(entry: &ResultEntry) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(code) = entry.metadata.code.as_deref() {
        parts.push(code);
    }
    if !entry.category.trim().is_empty() {
        parts.push(entry.category.trim());
    }
    if !entry.description.trim().is_empty() {
        parts.push(entry.description.trim());
    }
    parts.join(" · ")
}

impl Display for PanelView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.query.is_empty() {
            writeln!(f, "> {}", self.placeholder)?;
        } else {
            writeln!(f, "> {}", self.query)?;
        }
        if !self.open {
            return Ok(());
        }

        if let Some(filters) = &self.filters {
            let sorts: Vec<&str> = filters.sort_options.iter().map(|key| key.as_str()).collect();
            writeln!(
                f,
                "  [type: {}] [sort: {} ({})]",
                filters.entity,
                filters.sort,
                sorts.join("/")
            )?;
        }
        for section in &self.sections {
            writeln!(f, "  {}", section.title)?;
            for row in &section.rows {
                let marker = if row.highlighted { '>' } else { ' ' };
                let star = if row.favorite { "*" } else { "" };
                write!(f, "  {marker} {:>2}. [{}] {}{star}", row.index, row.kind, row.title)?;
                if !row.subtitle.is_empty() {
                    write!(f, " - {}", row.subtitle)?;
                }
                writeln!(f)?;
            }
        }
        if let Some(status) = &self.status {
            writeln!(f, "  {status}")?;
        }
        if let Some(role) = &self.user_role {
            writeln!(f, "  (signed in as {role})")?;
        }
        Ok(())
    }
}
