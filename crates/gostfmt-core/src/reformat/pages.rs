//! Page geometry and running page numbers

use gostfmt_ast::DocumentEditor;

use super::Reformatter;

impl<D: DocumentEditor + ?Sized> Reformatter<'_, D> {
    /// Every section gets the registry geometry; every section after the
    /// first also gets a page-number footer
    pub(super) fn format_pages(&mut self) {
        let page = self.registry.page();
        let sections = self.doc.section_count();
        for section in 0..sections {
            self.doc.set_page_geometry(section, &page.geometry);
            if section > 0 {
                self.doc.add_page_number_footer(section, &page.page_number);
            }
        }
        tracing::debug!(sections, "formatted pages");
    }
}
