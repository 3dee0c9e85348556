//! Every message tyme prints is phrased and colored here.

use std::{collections::BTreeMap, fmt::Display, path::Path};

use ansi_term::{Colour, Style};
use chrono::{DateTime, Utc};

use crate::{
    timeline::log::{ClosedSpan, TimeSpan},
    utils::time::elapsed_phrase,
};

const TIME_OF_DAY: &str = "%H:%M:%S";

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, style: Style, text: impl Display) -> String {
        if self.color {
            style.paint(text.to_string()).to_string()
        } else {
            text.to_string()
        }
    }

    fn activity(&self, name: &str) -> String {
        format!("'{}'", self.paint(Colour::Green.normal(), name))
    }

    fn elapsed(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        self.paint(
            Colour::Yellow.bold(),
            format!("({})", elapsed_phrase(start, end)),
        )
    }

    pub fn started(&self, name: &str, closed: Option<&ClosedSpan>) {
        if let Some(closed) = closed {
            self.stopped(closed);
        }
        println!("You started to spend time on {}.", self.activity(name));
    }

    pub fn stopped(&self, closed: &ClosedSpan) {
        println!("{}", self.stopped_line(closed));
    }

    fn stopped_line(&self, closed: &ClosedSpan) -> String {
        format!(
            "You spent {} on {}.",
            self.elapsed(closed.start, closed.end),
            self.activity(&closed.name)
        )
    }

    pub fn activity_created(&self, path: &str) {
        println!("New activity created at {}.", self.activity(path));
    }

    pub fn user_created(&self, user: &str, path: &Path) {
        println!("Created timeline of {} at {}", self.activity(user), path.display());
    }

    pub fn status(&self, ongoing: Option<&TimeSpan>, now: DateTime<Utc>) {
        match ongoing {
            Some(span) => {
                for line in self.span_lines(span, now) {
                    println!("{line}");
                }
            }
            None => println!("There is no ongoing activity."),
        }
    }

    /// Prints days oldest first, so the most recent activity ends up at the bottom.
    pub fn log(&self, recent: &BTreeMap<String, Vec<TimeSpan>>, now: DateTime<Utc>) {
        for line in self.log_lines(recent, now) {
            println!("{line}");
        }
    }

    fn log_lines(&self, recent: &BTreeMap<String, Vec<TimeSpan>>, now: DateTime<Utc>) -> Vec<String> {
        let mut lines = Vec::new();
        let mut last_end: Option<DateTime<Utc>> = None;
        for (day, spans) in recent {
            lines.push(self.paint(Colour::Purple.normal(), format!("{day}:")));
            for span in spans {
                // Time between the previous activity and this one wasn't tracked.
                if let Some(previous) = last_end.filter(|v| *v != span.start) {
                    let red = Colour::Red.normal();
                    lines.push(self.paint(red, " |"));
                    lines.push(format!(
                        "{} {}",
                        self.paint(red.dimmed(), " |"),
                        self.paint(red, format!("({})", elapsed_phrase(previous, span.start)))
                    ));
                    lines.push(self.paint(red, " |"));
                }
                lines.extend(self.span_lines(span, now));
                last_end = span.end;
            }
        }
        lines
    }

    fn span_lines(&self, span: &TimeSpan, now: DateTime<Utc>) -> Vec<String> {
        let blue = Colour::Blue.normal();
        let yellow = Colour::Yellow.normal();
        // An ongoing span has no end yet, only the ellipsis under the times.
        let end = match span.end {
            Some(end) => format!("   end:   {}", self.paint(yellow, end.format(TIME_OF_DAY))),
            None => format!("          {}", self.paint(yellow, "...")),
        };
        vec![
            format!(
                "{}{} {}:",
                self.paint(blue, " |-"),
                self.paint(Colour::Green.normal(), &span.name),
                self.elapsed(span.start, span.end.unwrap_or(now))
            ),
            format!(
                "{}   start: {}",
                self.paint(blue, " |"),
                self.paint(yellow, span.start.format(TIME_OF_DAY))
            ),
            format!("{}{end}", self.paint(blue, " |")),
            self.paint(blue, " V"),
        ]
    }

    /// Menu shown when placing an activity given by a bare name.
    pub fn placement_menu(&self, name: &str, options: &[String]) {
        println!("Where do you want to place the activity {}?", self.activity(name));
        for (index, option) in options.iter().enumerate() {
            println!("  {} {option}", self.paint(Colour::Yellow.normal(), format!("[{index}]")));
        }
    }
}
