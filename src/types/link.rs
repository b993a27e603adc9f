use std::fmt;

use super::ids::EntityKind;

/// A nullable foreign-key column from a source table to a target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub source: EntityKind,
    pub column: &'static str,
    pub target: EntityKind,
}

impl Link {
    pub const TEMPLATE_DEPARTMENT: Link = Link::new(
        EntityKind::Template,
        "department_id",
        EntityKind::Department,
    );
    pub const TEMPLATE_COLOR: Link = Link::new(EntityKind::Template, "color_id", EntityKind::Color);
    pub const TEMPLATE_COMPLETION_TYPE: Link = Link::new(
        EntityKind::Template,
        "completion_type_id",
        EntityKind::CompletionType,
    );
    pub const DEPARTMENT_TEMPLATE: Link = Link::new(
        EntityKind::Department,
        "template_id",
        EntityKind::Template,
    );
    pub const COMPLETION_TYPE_TEMPLATE: Link = Link::new(
        EntityKind::CompletionType,
        "template_id",
        EntityKind::Template,
    );
    pub const CATEGORY_TEMPLATE: Link =
        Link::new(EntityKind::Category, "template_id", EntityKind::Template);
    pub const CHILD_CATEGORY_COMPLETION_TYPE: Link = Link::new(
        EntityKind::ChildCategory,
        "completion_type_id",
        EntityKind::CompletionType,
    );
    pub const CHILD_CATEGORY_DEPARTMENT: Link = Link::new(
        EntityKind::ChildCategory,
        "department_id",
        EntityKind::Department,
    );
    pub const INFORMATION_TEMPLATE: Link = Link::new(
        EntityKind::Information,
        "template_id",
        EntityKind::Template,
    );

    pub const ALL: [Link; 9] = [
        Link::TEMPLATE_DEPARTMENT,
        Link::TEMPLATE_COLOR,
        Link::TEMPLATE_COMPLETION_TYPE,
        Link::DEPARTMENT_TEMPLATE,
        Link::COMPLETION_TYPE_TEMPLATE,
        Link::CATEGORY_TEMPLATE,
        Link::CHILD_CATEGORY_COMPLETION_TYPE,
        Link::CHILD_CATEGORY_DEPARTMENT,
        Link::INFORMATION_TEMPLATE,
    ];

    const fn new(source: EntityKind, column: &'static str, target: EntityKind) -> Self {
        Self {
            source,
            column,
            target,
        }
    }

    /// Finds the link a payload key names on the given source kind.
    #[must_use]
    pub fn find(source: EntityKind, column: &str) -> Option<Link> {
        Link::ALL
            .into_iter()
            .find(|link| link.source == source && link.column == column)
    }

    /// Links whose column points at `target`.
    pub fn referencing(target: EntityKind) -> impl Iterator<Item = Link> {
        Link::ALL.into_iter().filter(move |link| link.target == target)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}",
            self.source.table(),
            self.column,
            self.target.table()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matches_source_and_column() {
        assert_eq!(
            Link::find(EntityKind::ChildCategory, "department_id"),
            Some(Link::CHILD_CATEGORY_DEPARTMENT)
        );
        assert_eq!(
            Link::find(EntityKind::Template, "department_id"),
            Some(Link::TEMPLATE_DEPARTMENT)
        );
        assert_eq!(Link::find(EntityKind::Color, "template_id"), None);
        assert_eq!(Link::find(EntityKind::Template, "title"), None);
    }

    #[test]
    fn test_template_dependents() {
        let dependents: Vec<_> = Link::referencing(EntityKind::Template)
            .map(|link| link.source)
            .collect();
        assert_eq!(
            dependents,
            vec![
                EntityKind::Department,
                EntityKind::CompletionType,
                EntityKind::Category,
                EntityKind::Information,
            ]
        );
    }
}
