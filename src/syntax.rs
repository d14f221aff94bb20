use bitflags::bitflags;

bitflags! {
    /// Classifiers enabled for a file type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SyntaxFlags: u32 {
        const NUMBERS = 0b0000_0001;
    }
}

/// Highlighting rule of one file type. A pattern starting with '.' matches the file extension
/// exactly, any other pattern matches as a substring of the file name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntaxRule {
    pub filetype: &'static str,
    pub filematch: &'static [&'static str],
    pub flags: SyntaxFlags,
}

impl SyntaxRule {
    pub fn matches(&self, filename: &str) -> bool {
        let ext = filename.rfind('.').map(|idx| &filename[idx..]);
        self.filematch.iter().any(|pat| {
            if pat.starts_with('.') {
                ext == Some(*pat)
            } else {
                filename.contains(pat)
            }
        })
    }

    pub fn highlights_numbers(&self) -> bool {
        self.flags.contains(SyntaxFlags::NUMBERS)
    }
}

const C_RULE: SyntaxRule = SyntaxRule {
    filetype: "c",
    filematch: &[".c", ".h", ".cpp", ".hpp", ".cc"],
    flags: SyntaxFlags::NUMBERS,
};

const RUST_RULE: SyntaxRule = SyntaxRule {
    filetype: "rust",
    filematch: &[".rs"],
    flags: SyntaxFlags::NUMBERS,
};

const GO_RULE: SyntaxRule = SyntaxRule {
    filetype: "go",
    filematch: &[".go"],
    flags: SyntaxFlags::NUMBERS,
};

const JAVASCRIPT_RULE: SyntaxRule = SyntaxRule {
    filetype: "javascript",
    filematch: &[".js", ".mjs"],
    flags: SyntaxFlags::NUMBERS,
};

const PYTHON_RULE: SyntaxRule = SyntaxRule {
    filetype: "python",
    filematch: &[".py"],
    flags: SyntaxFlags::NUMBERS,
};

const MAKEFILE_RULE: SyntaxRule = SyntaxRule {
    filetype: "make",
    filematch: &["Makefile", ".mk"],
    flags: SyntaxFlags::empty(),
};

/// Ordered list of rules. The first rule matching a file name wins.
#[derive(Debug, Clone)]
pub struct SyntaxRegistry {
    rules: Vec<SyntaxRule>,
}

impl Default for SyntaxRegistry {
    fn default() -> Self {
        Self {
            rules: vec![
                C_RULE,
                RUST_RULE,
                GO_RULE,
                JAVASCRIPT_RULE,
                PYTHON_RULE,
                MAKEFILE_RULE,
            ],
        }
    }
}

impl SyntaxRegistry {
    pub fn empty() -> Self {
        Self { rules: vec![] }
    }

    pub fn register(&mut self, rule: SyntaxRule) {
        self.rules.push(rule);
    }

    pub fn detect(&self, filename: &str) -> Option<SyntaxRule> {
        self.rules.iter().find(|r| r.matches(filename)).copied()
    }
}
