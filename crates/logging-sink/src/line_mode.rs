/// Controls whether a rendered record is terminated by a newline before it is written.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum LineMode {
    /// Terminate each record with `\n` unless it already ends with one.
    #[default]
    WithNewline,
    /// Write the record exactly as rendered.
    WithoutNewline,
}

impl LineMode {
    /// Reports whether the mode terminates records with a newline.
    ///
    /// # Examples
    ///
    /// ```
    /// use logging_sink::LineMode;
    ///
    /// assert!(LineMode::WithNewline.append_newline());
    /// assert!(!LineMode::WithoutNewline.append_newline());
    /// ```
    #[must_use]
    pub const fn append_newline(self) -> bool {
        matches!(self, Self::WithNewline)
    }

    /// Applies the mode to a rendered record in place.
    ///
    /// A record that already ends with `\n` is left alone so messages that
    /// carry their own terminator are not double spaced.
    ///
    /// # Examples
    ///
    /// ```
    /// use logging_sink::LineMode;
    ///
    /// let mut line = String::from("ready");
    /// LineMode::WithNewline.terminate(&mut line);
    /// LineMode::WithNewline.terminate(&mut line);
    /// assert_eq!(line, "ready\n");
    /// ```
    pub fn terminate(self, record: &mut String) {
        if self.append_newline() && !record.ends_with('\n') {
            record.push('\n');
        }
    }
}

impl From<bool> for LineMode {
    /// `true` selects [`LineMode::WithNewline`], `false` selects [`LineMode::WithoutNewline`].
    fn from(append_newline: bool) -> Self {
        if append_newline {
            Self::WithNewline
        } else {
            Self::WithoutNewline
        }
    }
}

impl From<LineMode> for bool {
    fn from(mode: LineMode) -> Self {
        mode.append_newline()
    }
}

#[cfg(test)]
mod tests;
