use std::io::{self, BufRead, StdinLock};

use tracing::{debug, warn};

use crate::timeline::engine::PathSelector;

use super::render::Renderer;

/// Asks on the terminal where a new activity should be placed. Options are numbered and the
/// answer is either a number or the option text itself. An empty or unknown answer aborts.
pub struct StdinSelector<R> {
    renderer: Renderer,
    input: R,
}

impl StdinSelector<StdinLock<'static>> {
    pub fn stdin(renderer: Renderer) -> Self {
        Self::new(renderer, io::stdin().lock())
    }
}

impl<R: BufRead> StdinSelector<R> {
    pub fn new(renderer: Renderer, input: R) -> Self {
        Self { renderer, input }
    }
}

impl<R: BufRead> PathSelector for StdinSelector<R> {
    fn select(&mut self, name: &str, options: &[String]) -> Option<String> {
        self.renderer.placement_menu(name, options);

        let mut answer = String::new();
        if let Err(e) = self.input.read_line(&mut answer) {
            warn!("Failed to read selection {e}");
            return None;
        }
        let answer = answer.trim();
        debug!("Selected {answer:?}");

        match answer.parse::<usize>() {
            Ok(index) => options.get(index).cloned(),
            Err(_) => options.iter().find(|v| v.as_str() == answer).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::{cli::render::Renderer, timeline::engine::PathSelector};

    use super::StdinSelector;

    fn options() -> Vec<String> {
        vec!["/".into(), "work/".into(), "work/tyme/".into()]
    }

    #[test]
    fn test_select_by_index_and_text() {
        let mut selector = StdinSelector::new(Renderer::new(false), Cursor::new("2\n"));
        assert_eq!(selector.select("rust", &options()).as_deref(), Some("work/tyme/"));

        let mut selector = StdinSelector::new(Renderer::new(false), Cursor::new("work/\n"));
        assert_eq!(selector.select("rust", &options()).as_deref(), Some("work/"));
    }

    #[test]
    fn test_no_selection() {
        for input in ["", "\n", "7\n", "nowhere\n"] {
            let mut selector = StdinSelector::new(Renderer::new(false), Cursor::new(input));
            assert_eq!(selector.select("rust", &options()), None, "{input:?}");
        }
    }
}
