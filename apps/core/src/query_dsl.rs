use crate::model::EntityFilter;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedQuery {
    pub raw: String,
    pub free_text: String,
    pub entity_override: Option<EntityFilter>,
}

impl ParsedQuery {
    pub fn parse(query: &str, dsl_enabled: bool) -> Self {
        let raw = query.trim().to_string();
        if raw.is_empty() || !dsl_enabled {
            return Self {
                free_text: raw.clone(),
                raw,
                entity_override: None,
            };
        }

        let mut entity_override = None;
        let mut free_terms = Vec::new();
        for token in tokenize(&raw) {
            if let Some(filter) = parse_filter_token(&token) {
                entity_override = Some(filter);
                continue;
            }
            free_terms.push(token);
        }

        // Without filter tokens the text goes out exactly as typed.
        let free_text = if entity_override.is_some() {
            free_terms.join(" ")
        } else {
            raw.clone()
        };

        Self {
            raw,
            free_text,
            entity_override,
        }
    }

    pub fn text_len(&self) -> usize {
        self.free_text.chars().count()
    }
}

fn parse_filter_token(token: &str) -> Option<EntityFilter> {
    if let Some(value) = token.strip_prefix('@') {
        return EntityFilter::parse(value);
    }
    parse_prefixed(token, "type:").and_then(EntityFilter::parse)
}

fn parse_prefixed<'a>(token: &'a str, prefix: &str) -> Option<&'a str> {
    token
        .strip_prefix(prefix)
        .or_else(|| token.strip_prefix(&prefix.to_ascii_uppercase()))
}

fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
