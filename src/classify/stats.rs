//! Font-size statistics for heading detection.

use std::collections::{BTreeMap, BTreeSet};

use super::options::ClassifierOptions;
use crate::model::TextBlock;

/// Body size assumed for documents without any text.
const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Histogram key for a font size (0.1pt precision).
pub(crate) fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

fn key_size(key: i32) -> f32 {
    key as f32 / 10.0
}

/// Font statistics for one document.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Body text font size (most common block size)
    pub body_size: f32,
    /// Largest observed font size
    pub max_size: f32,
    /// Head size of each heading tier, largest first
    pub tier_sizes: Vec<f32>,
    /// Number of blocks per size key
    pub size_histogram: BTreeMap<i32, usize>,
    /// Tier index per size key
    tier_of_key: BTreeMap<i32, usize>,
    /// (bold, total) block counts per size key
    bold_votes: BTreeMap<i32, (usize, usize)>,
    /// Median left edge of body-size blocks per page
    page_indent: BTreeMap<u32, f32>,
    /// Median left edge of body-size blocks over the document
    document_indent: Option<f32>,
}

impl FontStatistics {
    /// Collect size, weight and indentation statistics from `blocks`.
    ///
    /// Tiers are not computed here; see [`compute_tiers`](Self::compute_tiers).
    pub fn from_blocks(blocks: &[TextBlock]) -> Self {
        let mut stats = Self::default();
        for block in blocks.iter().filter(|b| !b.is_empty()) {
            let key = size_key(block.font_size);
            *stats.size_histogram.entry(key).or_insert(0) += 1;
            let votes = stats.bold_votes.entry(key).or_insert((0, 0));
            if block.is_bold {
                votes.0 += 1;
            }
            votes.1 += 1;
        }

        if stats.size_histogram.is_empty() {
            stats.body_size = DEFAULT_BODY_SIZE;
            stats.max_size = DEFAULT_BODY_SIZE;
            return stats;
        }

        // Most frequent size; BTreeMap order makes ties go to the smaller size
        let mut body_key = 0;
        let mut body_count = 0;
        for (&key, &count) in &stats.size_histogram {
            if count > body_count {
                body_key = key;
                body_count = count;
            }
        }
        stats.body_size = key_size(body_key);
        stats.max_size = stats
            .size_histogram
            .keys()
            .next_back()
            .map(|&k| key_size(k))
            .unwrap_or(stats.body_size);

        let mut per_page: BTreeMap<u32, Vec<f32>> = BTreeMap::new();
        let mut all = Vec::new();
        for block in blocks.iter().filter(|b| size_key(b.font_size) == body_key) {
            per_page.entry(block.page).or_default().push(block.x);
            all.push(block.x);
        }
        stats.page_indent = per_page
            .into_iter()
            .filter_map(|(page, xs)| median(xs).map(|m| (page, m)))
            .collect();
        stats.document_indent = median(all);

        stats
    }

    /// Whether `size` is larger than body text by a meaningful margin.
    pub fn is_heading_size(&self, size: f32, options: &ClassifierOptions) -> bool {
        size > self.body_size + options.min_heading_delta
    }

    /// Bucket heading sizes into tiers.
    ///
    /// Sizes used only by `title_blocks` are left out. Sizes within
    /// `tier_merge_ratio` of a tier's head size join it, and anything past
    /// `max_tiers` folds into the last tier.
    pub fn compute_tiers(
        &mut self,
        blocks: &[TextBlock],
        title_blocks: &BTreeSet<usize>,
        options: &ClassifierOptions,
    ) {
        let mut non_title_keys = BTreeSet::new();
        for (i, block) in blocks.iter().enumerate() {
            if !title_blocks.contains(&i) && !block.is_empty() {
                non_title_keys.insert(size_key(block.font_size));
            }
        }

        let mut candidates: Vec<i32> = non_title_keys
            .into_iter()
            .filter(|&k| self.is_heading_size(key_size(k), options))
            .collect();
        candidates.sort_by(|a, b| b.cmp(a));

        self.tier_sizes.clear();
        self.tier_of_key.clear();
        let max_tiers = options.max_tiers.max(1);

        for key in candidates {
            let size = key_size(key);
            let joins_last = self
                .tier_sizes
                .last()
                .is_some_and(|&head| (head - size) / head <= options.tier_merge_ratio);
            if !joins_last && self.tier_sizes.len() < max_tiers {
                self.tier_sizes.push(size);
            }
            self.tier_of_key.insert(key, self.tier_sizes.len() - 1);
        }

        log::debug!(
            "Font statistics: body={:.1}pt, max={:.1}pt, tiers={:?}",
            self.body_size,
            self.max_size,
            self.tier_sizes
        );
    }

    /// Tier index (0 = largest) of a font size, if it is a heading size.
    pub fn tier_of(&self, size: f32) -> Option<usize> {
        self.tier_of_key.get(&size_key(size)).copied()
    }

    /// Majority boldness of blocks at `size`; an even split keeps `own`.
    pub fn majority_bold(&self, size: f32, own: bool) -> bool {
        match self.bold_votes.get(&size_key(size)) {
            Some(&(bold, total)) if bold * 2 > total => true,
            Some(&(bold, total)) if bold * 2 < total => false,
            _ => own,
        }
    }

    /// Body text indentation on `page`, falling back to the document median.
    pub fn body_indent(&self, page: u32) -> Option<f32> {
        self.page_indent.get(&page).copied().or(self.document_indent)
    }
}

fn median(mut values: Vec<f32>) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    Some(values[values.len() / 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(page: u32, size: f32, bold: bool, x: f32) -> TextBlock {
        TextBlock::new(page, "Some text", size, bold, x, 100.0)
    }

    fn blocks() -> Vec<TextBlock> {
        let mut blocks = vec![block(1, 24.0, true, 200.0)];
        for _ in 0..10 {
            blocks.push(block(1, 11.0, false, 72.0));
        }
        blocks.push(block(1, 18.0, true, 72.0));
        blocks.push(block(2, 17.6, true, 72.0));
        blocks.push(block(2, 14.0, false, 72.0));
        blocks.push(block(2, 14.0, true, 72.0));
        blocks.push(block(2, 14.0, true, 72.0));
        blocks.push(block(3, 12.0, true, 72.0));
        blocks.push(block(3, 11.2, false, 72.0));
        blocks
    }

    #[test]
    fn test_body_size_is_most_frequent() {
        let stats = FontStatistics::from_blocks(&blocks());
        assert!((stats.body_size - 11.0).abs() < 0.01);
        assert!((stats.max_size - 24.0).abs() < 0.01);
    }

    #[test]
    fn test_tiers_exclude_title_and_merge_close_sizes() {
        let blocks = blocks();
        let mut stats = FontStatistics::from_blocks(&blocks);
        let title: BTreeSet<usize> = [0].into_iter().collect();
        stats.compute_tiers(&blocks, &title, &ClassifierOptions::default());

        assert_eq!(stats.tier_sizes, vec![18.0, 14.0, 12.0]);
        assert_eq!(stats.tier_of(24.0), None);
        assert_eq!(stats.tier_of(18.0), Some(0));
        // 17.6 is within 5% of 18
        assert_eq!(stats.tier_of(17.6), Some(0));
        assert_eq!(stats.tier_of(14.0), Some(1));
        assert_eq!(stats.tier_of(12.0), Some(2));
        // Not more than 0.5pt above body
        assert_eq!(stats.tier_of(11.2), None);
        assert_eq!(stats.tier_of(11.0), None);
    }

    #[test]
    fn test_extra_sizes_fold_into_last_tier() {
        let blocks = blocks();
        let mut stats = FontStatistics::from_blocks(&blocks);
        let options = ClassifierOptions::default().with_max_tiers(2);
        stats.compute_tiers(&blocks, &BTreeSet::new(), &options);

        assert_eq!(stats.tier_sizes, vec![24.0, 18.0]);
        assert_eq!(stats.tier_of(14.0), Some(1));
        assert_eq!(stats.tier_of(12.0), Some(1));
    }

    #[test]
    fn test_majority_bold() {
        let stats = FontStatistics::from_blocks(&blocks());
        assert!(stats.majority_bold(14.0, false));
        assert!(!stats.majority_bold(11.0, true));
        assert!(stats.majority_bold(99.0, true));
    }

    #[test]
    fn test_body_indent() {
        let mut blocks = blocks();
        blocks.push(block(4, 16.0, false, 50.0));
        let stats = FontStatistics::from_blocks(&blocks);
        assert_eq!(stats.body_indent(1), Some(72.0));
        // Page 4 has no body-size text
        assert_eq!(stats.body_indent(4), Some(72.0));
    }

    #[test]
    fn test_empty_document() {
        let stats = FontStatistics::from_blocks(&[]);
        assert_eq!(stats.body_size, 12.0);
        assert_eq!(stats.tier_of(12.0), None);
        assert_eq!(stats.body_indent(1), None);
    }
}
