use serde::Serialize;

/// Where the results of a race or season can be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResultsRef<'a> {
    Link(&'a str),
    Upload(&'a str),
}

/// Shared results behaviour for records that can carry a results link and/or
/// an uploaded results document.
pub trait HasResults {
    fn results_link(&self) -> Option<&str>;

    fn results_upload(&self) -> Option<&str>;

    fn has_results(&self) -> bool {
        !self.results().is_empty()
    }

    /// Every available results source, link first. Empty when there are none.
    fn results(&self) -> Vec<ResultsRef<'_>> {
        let link = non_blank(self.results_link()).map(ResultsRef::Link);
        let upload = non_blank(self.results_upload()).map(ResultsRef::Upload);

        link.into_iter().chain(upload).collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
