use regex::Regex;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(r"\?"));

/// Collapses whitespace and rewrites `?` placeholders to Postgres `$n` form.
pub fn sql(query: &str) -> String {
    let cleaned = query.split_whitespace().collect::<Vec<&str>>().join(" ");
    let Ok(re) = PLACEHOLDER.as_ref() else {
        return cleaned;
    };
    let mut param_index = 0;
    re.replace_all(&cleaned, |_: &regex::Captures| {
        param_index += 1;
        format!("${}", param_index)
    })
    .into_owned()
}
