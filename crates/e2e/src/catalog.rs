//! Static section catalog of the presentation under test

use serde::Serialize;

/// Number of sections the presentation exposes
pub const TOTAL_SECTIONS: u32 = 14;

/// Sections captured by the visual regression suite (Intro, Methods, Tools, End)
pub const KEY_SECTIONS: [u32; 4] = [1, 6, 10, 14];

/// A single slide section as listed in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Section {
    /// 1-based position in the deck
    pub number: u32,

    /// Short label shown in the sidebar
    pub name: &'static str,

    /// Heading rendered inside the main region
    pub title: &'static str,
}

impl Section {
    /// Lowercased name with whitespace runs collapsed to `-`
    pub fn slug(&self) -> String {
        self.name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Text of the progress indicator while this section is shown
    pub fn progress_label(&self) -> String {
        progress_label(self.number)
    }

    /// Baseline screenshot name for this section
    pub fn snapshot_name(&self) -> String {
        format!("section-{}-{}", self.number, self.slug())
    }
}

pub const SECTIONS: [Section; TOTAL_SECTIONS as usize] = [
    Section { number: 1, name: "Intro", title: "Quality Assurance with Thomas Adika" },
    Section { number: 2, name: "Agenda", title: "What We'll Cover Today" },
    Section { number: 3, name: "Fundamentals", title: "QA Fundamentals: What Is It?" },
    Section { number: 4, name: "Practice", title: "QA in Action: Real-World Practice" },
    Section { number: 5, name: "Reliability", title: "Building Reliable & Secure Systems" },
    Section { number: 6, name: "Methods", title: "Key Testing Methodologies" },
    Section { number: 7, name: "Modern Dev", title: "QA in Modern Software Development" },
    Section { number: 8, name: "Security", title: "QA in Cybersecurity" },
    Section { number: 9, name: "Careers", title: "Starting & Growing a QA Career" },
    Section { number: 10, name: "Tools", title: "Essential Tools in QA" },
    Section { number: 11, name: "Practices", title: "Best Practices for QA Success" },
    Section { number: 12, name: "Takeaways", title: "Key Takeaways" },
    Section { number: 13, name: "Q&A", title: "Questions & Discussion" },
    Section { number: 14, name: "End", title: "Thank You!" },
];

/// Look up a section by its 1-based number
pub fn section(number: u32) -> Option<&'static Section> {
    SECTIONS.iter().find(|s| s.number == number)
}

/// Progress text for a position, e.g. `"6 / 14"`
pub fn progress_label(position: u32) -> String {
    format!("{} / {}", position, TOTAL_SECTIONS)
}

/// Iterate the key sections used for visual snapshots
pub fn key_sections() -> impl Iterator<Item = &'static Section> {
    KEY_SECTIONS.iter().filter_map(|n| section(*n))
}
