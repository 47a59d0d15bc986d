// Tue Feb 03 2026 - Alex

use crate::rules::RuleError;

/// One rule from a rule file: named string patterns plus a condition.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub strings: Vec<RuleString>,
    pub condition: Condition,
}

#[derive(Debug, Clone)]
pub struct RuleString {
    pub ident: String,
    pub body: StringBody,
    pub modifiers: StringModifiers,
}

#[derive(Debug, Clone)]
pub enum StringBody {
    Text(String),
    Hex(String),
    Regex(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringModifiers {
    pub nocase: bool,
    pub wide: bool,
    pub ascii: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Any string occurrence satisfies the rule.
    Any,
    /// Every string must occur at least once within a scanned window.
    All,
    /// Unrecognized condition text, treated as `Any`.
    Custom(String),
}

/// Parse a rule-file source into its rules.
///
/// Simplified grammar: `rule <name> { strings: $id = <body> [modifiers]
/// ... condition: <text> }`. Bodies are `"text"`, `{ hex }` or `/regex/`.
pub fn parse_rules(source: &str) -> Result<Vec<Rule>, RuleError> {
    let mut rules = Vec::new();
    let mut rest = source;

    while let Some(pos) = find_rule_keyword(rest) {
        let after_keyword = &rest[pos + 4..];
        let brace = after_keyword
            .find('{')
            .ok_or_else(|| RuleError::Parse("rule body has no opening brace".to_string()))?;

        let name = after_keyword[..brace]
            .split(|c: char| c == ':' || c.is_whitespace())
            .find(|s| !s.is_empty())
            .ok_or_else(|| RuleError::Parse("rule has no name".to_string()))?
            .to_string();

        let body_start = &after_keyword[brace..];
        let body_len = matching_brace(body_start)
            .ok_or_else(|| RuleError::Parse(format!("unbalanced braces in rule '{}'", name)))?;
        let body = &body_start[1..body_len];

        rules.push(parse_rule_body(name, body)?);
        rest = &after_keyword[brace + body_len + 1..];
    }

    Ok(rules)
}

/// Find a `rule` keyword at a token boundary.
fn find_rule_keyword(source: &str) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut from = 0;
    while let Some(rel) = source[from..].find("rule") {
        let pos = from + rel;
        let at_start = pos == 0 || bytes[pos - 1].is_ascii_whitespace();
        let followed = bytes
            .get(pos + 4)
            .map(|b| b.is_ascii_whitespace())
            .unwrap_or(false);
        if at_start && followed {
            return Some(pos);
        }
        from = pos + 4;
    }
    None
}

/// Length of the brace-balanced span starting at the `{` at index 0,
/// returned as the index of the closing brace. Hex string bodies nest
/// their own balanced braces; quoted braces are not tracked.
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_rule_body(name: String, body: &str) -> Result<Rule, RuleError> {
    let mut strings = Vec::new();
    let mut condition = Condition::Any;

    if let Some(strings_start) = body.find("strings:") {
        let strings_section = &body[strings_start + "strings:".len()..];
        let strings_end = strings_section
            .find("condition:")
            .unwrap_or(strings_section.len());
        for line in strings_section[..strings_end].lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            strings.push(parse_string_line(line, &name)?);
        }
    }

    if let Some(cond_start) = body.find("condition:") {
        condition = parse_condition(body[cond_start + "condition:".len()..].trim());
    }

    if strings.is_empty() {
        return Err(RuleError::Parse(format!("rule '{}' declares no strings", name)));
    }

    Ok(Rule { name, strings, condition })
}

fn parse_string_line(line: &str, rule_name: &str) -> Result<RuleString, RuleError> {
    if !line.starts_with('$') {
        return Err(RuleError::Parse(format!(
            "rule '{}': string declaration must start with '$': {}",
            rule_name, line
        )));
    }

    let eq = line.find('=').ok_or_else(|| {
        RuleError::Parse(format!("rule '{}': string has no '=': {}", rule_name, line))
    })?;
    let ident = line[1..eq].trim().to_string();
    let value = line[eq + 1..].trim();

    let (body, tail) = if let Some(stripped) = value.strip_prefix('"') {
        let close = stripped.find('"').ok_or_else(|| {
            RuleError::Parse(format!("rule '{}': unterminated text string", rule_name))
        })?;
        (StringBody::Text(stripped[..close].to_string()), &stripped[close + 1..])
    } else if let Some(stripped) = value.strip_prefix('{') {
        let close = stripped.find('}').ok_or_else(|| {
            RuleError::Parse(format!("rule '{}': unterminated hex string", rule_name))
        })?;
        (StringBody::Hex(stripped[..close].trim().to_string()), &stripped[close + 1..])
    } else if let Some(stripped) = value.strip_prefix('/') {
        let close = stripped.rfind('/').filter(|&c| c > 0).ok_or_else(|| {
            RuleError::Parse(format!("rule '{}': unterminated regex string", rule_name))
        })?;
        (StringBody::Regex(stripped[..close].to_string()), &stripped[close + 1..])
    } else {
        return Err(RuleError::Parse(format!(
            "rule '{}': unrecognized string body: {}",
            rule_name, value
        )));
    };

    let mut modifiers = StringModifiers::default();
    for word in tail.split_whitespace() {
        match word {
            "nocase" => modifiers.nocase = true,
            "wide" => modifiers.wide = true,
            "ascii" => modifiers.ascii = true,
            other => {
                log::debug!("rule '{}': ignoring string modifier '{}'", rule_name, other);
            }
        }
    }

    Ok(RuleString { ident, body, modifiers })
}

fn parse_condition(text: &str) -> Condition {
    match text.trim() {
        "any of them" => Condition::Any,
        "all of them" => Condition::All,
        other => Condition::Custom(other.to_string()),
    }
}
