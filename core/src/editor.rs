/// The slice of a host editor a filter run needs: read the current selection
/// and replace it with new text.
pub trait Editor {
    /// Text of the current selection, if any.
    fn selected_text(&self) -> Option<&str>;

    /// Replaces the current selection with `text`.
    fn replace_selection(&mut self, text: &str) -> std::io::Result<()>;
}

impl<E: Editor + ?Sized> Editor for &mut E {
    fn selected_text(&self) -> Option<&str> {
        (**self).selected_text()
    }

    fn replace_selection(&mut self, text: &str) -> std::io::Result<()> {
        (**self).replace_selection(text)
    }
}
