/// Disjoint sets over `0..n` with path compression and union by rank.
#[derive(Debug, Clone)]
pub(crate) struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
    n_components: usize,
}

impl UnionFind {
    pub(crate) fn new(n_samples: usize) -> Self {
        UnionFind {
            parent: (0..n_samples).collect(),
            rank: vec![0; n_samples],
            n_components: n_samples,
        }
    }

    pub(crate) fn find(&mut self, n: usize) -> usize {
        let mut root = n;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = n;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Joins the sets holding `m` and `n`, returning the new root. Returns `None` if they
    /// were already in the same set.
    pub(crate) fn union(&mut self, m: usize, n: usize) -> Option<usize> {
        let root_m = self.find(m);
        let root_n = self.find(n);
        if root_m == root_n {
            return None;
        }
        let (parent, child) = if self.rank[root_m] >= self.rank[root_n] {
            (root_m, root_n)
        } else {
            (root_n, root_m)
        };
        self.parent[child] = parent;
        if self.rank[parent] == self.rank[child] {
            self.rank[parent] = self.rank[parent].saturating_add(1);
        }
        self.n_components -= 1;
        Some(parent)
    }

    pub(crate) fn n_components(&self) -> usize {
        self.n_components
    }
}
