use crate::SearchResult;
use chrono::{DateTime, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBucket {
    High,
    Medium,
    Low,
    Minimal,
}

impl ScoreBucket {
    /// Thresholds are strict: exactly 0.75 is `Medium`, exactly 0.5 is `Low`.
    pub fn for_score(score: f64) -> Self {
        if score > 0.75 {
            Self::High
        } else if score > 0.5 {
            Self::Medium
        } else if score > 0.25 {
            Self::Low
        } else {
            Self::Minimal
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::High => "#56EAFF",
            Self::Medium => "#1DBBD1",
            Self::Low => "#0D7280",
            Self::Minimal => "#084F59",
        }
    }

    /// The two bright buckets need dark text on top of them.
    pub fn dark_text(self) -> bool {
        matches!(self, Self::High | Self::Medium)
    }
}

/// Reads the leading number of a score like `"5MB"` or `" 3pts"`; no number reads as 0.
fn keyword_score(raw: &str) -> f64 {
    let text = raw.trim_start();
    let numeric = text
        .bytes()
        .take_while(|&byte| {
            byte.is_ascii_digit() || matches!(byte, b'+' | b'-' | b'.' | b'e' | b'E')
        })
        .count();

    (1..=numeric)
        .rev()
        .find_map(|end| text[..end].parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Keywords by descending score; equal scores keep the backend's order.
pub fn sorted_keywords(keywords: &[(String, String)]) -> Vec<(&str, &str)> {
    let mut sorted: Vec<(&str, &str)> = keywords
        .iter()
        .map(|(word, score)| (word.as_str(), score.as_str()))
        .collect();
    sorted.sort_by(|(_, left), (_, right)| keyword_score(right).total_cmp(&keyword_score(left)));
    sorted
}

/// Query text built from a result's keywords, strongest first.
pub fn similar_query(result: &SearchResult) -> String {
    sorted_keywords(&result.keywords)
        .into_iter()
        .map(|(word, _)| word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `Thu Jun 16 2016`, or the raw text when the timestamp cannot be read.
pub fn display_date(raw: &str) -> String {
    const FORMAT: &str = "%a %b %d %Y";

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(FORMAT).to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return parsed.format(FORMAT).to_string();
    }
    raw.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSection {
    Children,
    Parents,
}

/// One rendered search result with its own link-list toggles.
#[derive(Debug, Clone)]
pub struct ResultCard {
    result: SearchResult,
    children_expanded: bool,
    parents_expanded: bool,
}

impl ResultCard {
    pub fn new(result: SearchResult) -> Self {
        Self {
            result,
            children_expanded: false,
            parents_expanded: false,
        }
    }

    pub fn result(&self) -> &SearchResult {
        &self.result
    }

    pub fn bucket(&self) -> ScoreBucket {
        ScoreBucket::for_score(self.result.score)
    }

    pub fn keywords(&self) -> Vec<(&str, &str)> {
        sorted_keywords(&self.result.keywords)
    }

    pub fn is_expanded(&self, section: LinkSection) -> bool {
        match section {
            LinkSection::Children => self.children_expanded,
            LinkSection::Parents => self.parents_expanded,
        }
    }

    pub fn toggle(&mut self, section: LinkSection) -> bool {
        let flag = match section {
            LinkSection::Children => &mut self.children_expanded,
            LinkSection::Parents => &mut self.parents_expanded,
        };
        *flag = !*flag;
        *flag
    }

    pub fn render(&self) -> String {
        let result = &self.result;
        let mut lines = vec![
            format!("[{}] {}", result.score, result.title),
            format!("  {}", result.link),
            format!(
                "  {} | {}",
                display_date(&result.last_modification_date),
                result.file_size
            ),
        ];

        let chips = self
            .keywords()
            .into_iter()
            .map(|(word, score)| format!("{word} {score}"))
            .collect::<Vec<_>>();
        if !chips.is_empty() {
            lines.push(format!("  {}", chips.join(" · ")));
        }

        lines.extend(link_lines("Children Links", &result.children_links, self.children_expanded));
        lines.extend(link_lines("Parent Links", &result.parent_links, self.parents_expanded));

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

fn link_lines(heading: &str, links: &[String], expanded: bool) -> Vec<String> {
    if links.is_empty() {
        return Vec::new();
    }

    let marker = if expanded { "▲" } else { "▼" };
    let mut lines = vec![format!("  {heading} ({}) {marker}", links.len())];
    if expanded {
        lines.extend(links.iter().map(|link| format!("    - {link}")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_keywords(keywords: &[(&str, &str)]) -> SearchResult {
        SearchResult {
            score: 0.99999,
            title: "Home Move (2001)".to_string(),
            link: "https://www.cse.hk.hk/alumni/2016-06-08".to_string(),
            last_modification_date: "2016-06-16T00:00:00Z".to_string(),
            file_size: "5931B".to_string(),
            keywords: keywords
                .iter()
                .map(|(word, score)| (word.to_string(), score.to_string()))
                .collect(),
            children_links: vec![
                "http://childlink1.com".to_string(),
                "http://childlink2.com".to_string(),
            ],
            parent_links: vec!["http://parentlink1.com".to_string()],
        }
    }

    #[test]
    fn buckets_use_exclusive_thresholds() {
        assert_eq!(ScoreBucket::for_score(0.8), ScoreBucket::High);
        assert_eq!(ScoreBucket::for_score(0.6), ScoreBucket::Medium);
        assert_eq!(ScoreBucket::for_score(0.3), ScoreBucket::Low);
        assert_eq!(ScoreBucket::for_score(0.1), ScoreBucket::Minimal);
        assert_eq!(ScoreBucket::for_score(0.75), ScoreBucket::Medium);
        assert_eq!(ScoreBucket::for_score(0.5), ScoreBucket::Low);
        assert_eq!(ScoreBucket::for_score(0.25), ScoreBucket::Minimal);
        assert_eq!(ScoreBucket::for_score(1.5), ScoreBucket::High);
        assert_eq!(ScoreBucket::for_score(-0.2), ScoreBucket::Minimal);
    }

    #[test]
    fn similar_query_is_stable_on_ties() {
        let result = result_with_keywords(&[("a", "0.9"), ("b", "0.9"), ("c", "0.2")]);
        assert_eq!(similar_query(&result), "a b c");

        let result = result_with_keywords(&[("c", "0.2"), ("b", "0.9"), ("a", "0.9")]);
        assert_eq!(similar_query(&result), "b a c");
    }

    #[test]
    fn keyword_chips_sort_numerically() {
        let result = result_with_keywords(&[("CSE", "3"), ("MOV", "5"), ("TEST", "4"), ("X", "10")]);
        let card = ResultCard::new(result);
        let words: Vec<_> = card.keywords().into_iter().map(|(word, _)| word).collect();
        assert_eq!(words, vec!["X", "MOV", "TEST", "CSE"]);
    }

    #[test]
    fn keyword_scores_use_leading_number() {
        assert_eq!(keyword_score("5MB"), 5.0);
        assert_eq!(keyword_score(" 3pts"), 3.0);
        assert_eq!(keyword_score("1e2x"), 100.0);
        assert_eq!(keyword_score("-0.5"), -0.5);
        assert_eq!(keyword_score("pts"), 0.0);
        assert_eq!(keyword_score(""), 0.0);

        let result = result_with_keywords(&[("A", "2pts"), ("B", "10pts"), ("C", "n/a")]);
        assert_eq!(similar_query(&result), "B A C");
    }

    #[test]
    fn link_sections_toggle_independently() {
        let mut card = ResultCard::new(result_with_keywords(&[]));
        assert!(!card.is_expanded(LinkSection::Children));
        assert!(!card.is_expanded(LinkSection::Parents));

        assert!(card.toggle(LinkSection::Children));
        assert!(!card.is_expanded(LinkSection::Parents));

        let rendered = card.render();
        assert!(rendered.contains("    - http://childlink2.com"));
        assert!(!rendered.contains("    - http://parentlink1.com"));

        assert!(!card.toggle(LinkSection::Children));
        assert!(!card.render().contains("    - http://childlink1.com"));
    }

    #[test]
    fn card_shows_date_and_size() {
        let card = ResultCard::new(result_with_keywords(&[("CSE", "3")]));
        let rendered = card.render();
        assert!(rendered.contains("Thu Jun 16 2016 | 5931B"));
        assert!(rendered.contains("CSE 3"));
    }

    #[test]
    fn collapsed_card_renders_line_by_line() {
        let card = ResultCard::new(result_with_keywords(&[("CSE", "3"), ("MOV", "5")]));
        assert_eq!(
            card.render(),
            "[0.99999] Home Move (2001)\n\
             \x20 https://www.cse.hk.hk/alumni/2016-06-08\n\
             \x20 Thu Jun 16 2016 | 5931B\n\
             \x20 MOV 5 · CSE 3\n\
             \x20 Children Links (2) ▼\n\
             \x20 Parent Links (1) ▼\n"
        );
    }

    #[test]
    fn unreadable_dates_are_shown_verbatim() {
        assert_eq!(display_date("2023-05-16 05:03:16"), "Tue May 16 2023");
        assert_eq!(display_date("yesterday"), "yesterday");
    }
}
