use super::Gene;

/// Pre-order walk over a gene subtree.
///
/// A gene matching the exclusion predicate is still yielded, but none of its
/// descendants are. The walk is lazy and allocation is bounded by the tree depth
/// times the branching factor; calling `Gene::flat_view` again restarts it.
#[derive(Clone)]
pub struct FlatView<'a, F> {
    stack: Vec<&'a Gene>,
    exclude: F,
}

impl<'a, F> FlatView<'a, F>
where
    F: Fn(&Gene) -> bool,
{
    pub(crate) fn new(root: &'a Gene, exclude: F) -> Self {
        Self {
            stack: vec![root],
            exclude,
        }
    }
}

impl<'a, F> Iterator for FlatView<'a, F>
where
    F: Fn(&Gene) -> bool,
{
    type Item = &'a Gene;

    fn next(&mut self) -> Option<&'a Gene> {
        let gene = self.stack.pop()?;
        if !(self.exclude)(gene) {
            let children = gene.children();
            self.stack.extend(children.into_iter().rev());
        }
        Some(gene)
    }
}

/// Same walk as [`FlatView`], but each gene comes with its child-index path
/// relative to the root of the walk.
#[derive(Clone)]
pub struct FlatPaths<'a, F> {
    stack: Vec<(Vec<usize>, &'a Gene)>,
    exclude: F,
}

impl<'a, F> FlatPaths<'a, F>
where
    F: Fn(&Gene) -> bool,
{
    pub(crate) fn new(root: &'a Gene, exclude: F) -> Self {
        Self {
            stack: vec![(Vec::new(), root)],
            exclude,
        }
    }
}

impl<'a, F> Iterator for FlatPaths<'a, F>
where
    F: Fn(&Gene) -> bool,
{
    type Item = (Vec<usize>, &'a Gene);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, gene) = self.stack.pop()?;
        if !(self.exclude)(gene) {
            for (i, child) in gene.children().into_iter().enumerate().rev() {
                let mut child_path = path.clone();
                child_path.push(i);
                self.stack.push((child_path, child));
            }
        }
        Some((path, gene))
    }
}
