use std::mem::swap;

/// Edit-distance matcher used to suggest registered flags for a mistyped one.
pub(crate) struct Spell {
    previous: Vec<usize>,
    current: Vec<usize>,
    left: Vec<char>,
    right: Vec<char>,
}

impl Spell {
    pub const fn new() -> Self {
        Self {
            previous: Vec::new(),
            current: Vec::new(),
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    /// Candidates closer than `maximum` edits to `word`, nearest first.
    pub fn suggest<'a>(
        &mut self,
        word: &str,
        candidates: impl IntoIterator<Item = &'a str>,
        maximum: usize,
    ) -> Vec<String> {
        let mut results = Vec::new();
        for candidate in candidates {
            let distance = self.distance(word, candidate);
            if distance < maximum {
                results.push((distance, candidate));
            }
        }
        results.sort();
        results
            .into_iter()
            .map(|(_, candidate)| candidate.to_owned())
            .collect()
    }

    fn distance(&mut self, left: &str, right: &str) -> usize {
        self.left.clear();
        self.left.extend(left.chars().map(|letter| letter.to_ascii_lowercase()));
        self.right.clear();
        self.right.extend(right.chars().map(|letter| letter.to_ascii_lowercase()));
        if self.left.len() > self.right.len() {
            swap(&mut self.left, &mut self.right);
        }

        let Self {
            previous,
            current,
            left,
            right,
        } = self;
        previous.clear();
        previous.extend(0..=left.len());
        current.clear();
        current.resize(left.len() + 1, 0);

        for (i, right) in right.iter().enumerate() {
            current[0] = i + 1;
            for (j, left) in left.iter().enumerate() {
                let insert = current[j] + 1;
                let delete = previous[j + 1] + 1;
                let replace = previous[j] + usize::from(left != right);
                current[j + 1] = insert.min(delete).min(replace);
            }
            swap(previous, current);
        }

        previous[left.len()]
    }
}
