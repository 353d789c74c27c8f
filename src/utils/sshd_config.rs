use std::fmt;

/// One line of an sshd_config file, kept verbatim for re-serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigLine {
    Blank(String),
    Comment(String),
    Directive {
        raw: String,
        keyword: String,
        value: String,
    },
}

impl ConfigLine {
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return ConfigLine::Blank(line.to_string());
        }
        if trimmed.starts_with('#') {
            return ConfigLine::Comment(line.to_string());
        }

        // Keyword ends at the first whitespace or '='
        let split_at = trimmed
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(trimmed.len());
        let keyword = &trimmed[..split_at];
        let value = trimmed[split_at..]
            .trim_start()
            .trim_start_matches('=')
            .trim();

        ConfigLine::Directive {
            raw: line.to_string(),
            keyword: keyword.to_string(),
            value: value.to_string(),
        }
    }

    fn raw(&self) -> &str {
        match self {
            ConfigLine::Blank(raw) | ConfigLine::Comment(raw) => raw,
            ConfigLine::Directive { raw, .. } => raw,
        }
    }

    fn is_keyword(&self, name: &str) -> bool {
        matches!(self, ConfigLine::Directive { keyword, .. } if keyword.eq_ignore_ascii_case(name))
    }
}

/// What `SshdConfig::set` did to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetAction {
    /// An active line already carried the requested value
    Unchanged,
    Replaced,
    Appended,
}

/// sshd_config modelled as an ordered list of lines.
///
/// Only the global section (everything before the first `Match`) is
/// mutated. Conditional blocks are left alone and can be inspected with
/// [`SshdConfig::match_overrides`]. Each line keeps its own terminator
/// (`\n`, `\r\n`, or none on an unterminated last line).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SshdConfig {
    lines: Vec<ConfigLine>,
    endings: Vec<&'static str>,
}

fn split_ending(chunk: &str) -> (&str, &'static str) {
    if let Some(text) = chunk.strip_suffix("\r\n") {
        (text, "\r\n")
    } else if let Some(text) = chunk.strip_suffix('\n') {
        (text, "\n")
    } else {
        (chunk, "")
    }
}

impl SshdConfig {
    /// Parse sshd_config content
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();
        for chunk in content.split_inclusive('\n') {
            let (text, ending) = split_ending(chunk);
            config.lines.push(ConfigLine::parse(text));
            config.endings.push(ending);
        }
        config
    }

    /// Terminator for new lines: whatever the file already uses
    fn line_ending(&self) -> &'static str {
        self.endings
            .iter()
            .copied()
            .find(|ending| !ending.is_empty())
            .unwrap_or("\n")
    }

    fn insert_line(&mut self, index: usize, line: ConfigLine) {
        let mut ending = self.line_ending();
        if index == self.lines.len() {
            // An unterminated last line stays last-and-unterminated
            if let Some(last) = self.endings.last_mut() {
                if last.is_empty() {
                    *last = ending;
                    ending = "";
                }
            }
        }
        self.lines.insert(index, line);
        self.endings.insert(index, ending);
    }

    fn remove_line(&mut self, index: usize) {
        self.lines.remove(index);
        let ending = self.endings.remove(index);
        if ending.is_empty() && index == self.lines.len() {
            if let Some(last) = self.endings.last_mut() {
                *last = "";
            }
        }
    }

    pub fn lines(&self) -> &[ConfigLine] {
        &self.lines
    }

    /// Index of the first `Match` line, or the line count when there is none
    fn global_end(&self) -> usize {
        self.lines
            .iter()
            .position(|line| line.is_keyword("Match"))
            .unwrap_or(self.lines.len())
    }

    /// Effective global value of a directive (sshd uses the first occurrence)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.lines[..self.global_end()]
            .iter()
            .find_map(|line| match line {
                ConfigLine::Directive { keyword, value, .. }
                    if keyword.eq_ignore_ascii_case(name) =>
                {
                    Some(value.as_str())
                }
                _ => None,
            })
    }

    /// Number of active global lines for a directive
    pub fn count_active(&self, name: &str) -> usize {
        self.lines[..self.global_end()]
            .iter()
            .filter(|line| line.is_keyword(name))
            .count()
    }

    /// Values a directive takes inside `Match` blocks
    pub fn match_overrides(&self, name: &str) -> Vec<&str> {
        self.lines[self.global_end()..]
            .iter()
            .filter_map(|line| match line {
                ConfigLine::Directive { keyword, value, .. }
                    if keyword.eq_ignore_ascii_case(name) =>
                {
                    Some(value.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// `Include` targets, which sshd reads in place and may shadow later lines
    pub fn includes(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                ConfigLine::Directive { keyword, value, .. }
                    if keyword.eq_ignore_ascii_case("Include") =>
                {
                    Some(value.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Set a global directive so exactly one active line carries `value`.
    ///
    /// The first active occurrence is rewritten in place (keeping its
    /// indentation), later duplicates are dropped, and a missing directive
    /// is inserted just before the first `Match` block.
    pub fn set(&mut self, name: &str, value: &str) -> SetAction {
        let global_end = self.global_end();
        let positions: Vec<usize> = (0..global_end)
            .filter(|&i| self.lines[i].is_keyword(name))
            .collect();

        let Some((&first, duplicates)) = positions.split_first() else {
            let line = ConfigLine::Directive {
                raw: format!("{} {}", name, value),
                keyword: name.to_string(),
                value: value.to_string(),
            };
            self.insert_line(global_end, line);
            return SetAction::Appended;
        };

        let already_set = matches!(
            &self.lines[first],
            ConfigLine::Directive { value: current, .. } if current == value
        );

        // Remove from the back so earlier indices stay valid
        for &index in duplicates.iter().rev() {
            self.remove_line(index);
        }

        if already_set {
            return if duplicates.is_empty() {
                SetAction::Unchanged
            } else {
                SetAction::Replaced
            };
        }

        let indent: String = self.lines[first]
            .raw()
            .chars()
            .take_while(|c| c.is_whitespace())
            .collect();
        self.lines[first] = ConfigLine::Directive {
            raw: format!("{}{} {}", indent, name, value),
            keyword: name.to_string(),
            value: value.to_string(),
        };
        SetAction::Replaced
    }
}

impl fmt::Display for SshdConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (line, ending) in self.lines.iter().zip(&self.endings) {
            write!(f, "{}{}", line.raw(), ending)?;
        }
        Ok(())
    }
}
