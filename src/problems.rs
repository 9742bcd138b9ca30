//! Built-in problem catalog.
//!
//! Problems are immutable once constructed and handed to sessions as `Arc`
//! references; the engine never mutates catalog entries.

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// One input/expected-output pair used when evaluating submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected: String,
}

/// An algorithm problem record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub title: String,
    pub statement: String,
    pub difficulty: Difficulty,
    pub expected_complexity: Option<String>,
    pub test_cases: Vec<TestCase>,
    /// Solution hints fed to the model when building guidance prompts;
    /// never shown verbatim to the learner.
    pub hints: Vec<String>,
}

/// Read-only provider of problems, selectable by title or at random.
pub struct ProblemLibrary {
    problems: Vec<Arc<Problem>>,
}

impl Default for ProblemLibrary {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ProblemLibrary {
    /// Catalog seeded with the built-in problem set.
    pub fn with_builtins() -> Self {
        Self {
            problems: builtin_problems().into_iter().map(Arc::new).collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            problems: Vec::new(),
        }
    }

    pub fn add(&mut self, problem: Problem) {
        self.problems.push(Arc::new(problem));
    }

    /// First problem whose title contains `needle`, case-insensitive.
    pub fn by_title(&self, needle: &str) -> Option<Arc<Problem>> {
        let needle = needle.to_lowercase();
        self.problems
            .iter()
            .find(|p| p.title.to_lowercase().contains(&needle))
            .cloned()
    }

    pub fn list(&self, difficulty: Option<Difficulty>) -> Vec<Arc<Problem>> {
        self.problems
            .iter()
            .filter(|p| difficulty.is_none_or(|d| p.difficulty == d))
            .cloned()
            .collect()
    }

    pub fn random(&self, difficulty: Option<Difficulty>) -> Option<Arc<Problem>> {
        self.list(difficulty)
            .choose(&mut rand::thread_rng())
            .cloned()
    }
}

fn problem(
    title: &str,
    statement: &str,
    difficulty: Difficulty,
    expected_complexity: &str,
    test_cases: &[(&str, &str)],
    hints: &[&str],
) -> Problem {
    Problem {
        title: title.to_string(),
        statement: statement.to_string(),
        difficulty,
        expected_complexity: Some(expected_complexity.to_string()),
        test_cases: test_cases
            .iter()
            .map(|(input, expected)| TestCase {
                input: (*input).to_string(),
                expected: (*expected).to_string(),
            })
            .collect(),
        hints: hints.iter().map(|h| (*h).to_string()).collect(),
    }
}

fn builtin_problems() -> Vec<Problem> {
    vec![
        problem(
            "Two Sum",
            "Given an integer array nums and an integer target, return the indices of \
             the two numbers that add up to target. Each input has exactly one answer, \
             and you may not use the same element twice.\n\n\
             Example: nums = [2, 7, 11, 15], target = 9 -> [0, 1] because \
             nums[0] + nums[1] == 9.",
            Difficulty::Easy,
            "O(n) time, O(n) space",
            &[
                ("nums = [2, 7, 11, 15], target = 9", "[0, 1]"),
                ("nums = [3, 2, 4], target = 6", "[1, 2]"),
                ("nums = [3, 3], target = 6", "[0, 1]"),
            ],
            &[
                "Store numbers you have already seen in a hash map",
                "For each number, check whether target - num is already in the map",
            ],
        ),
        problem(
            "Valid Parentheses",
            "Given a string s containing only '(', ')', '{', '}', '[' and ']', decide \
             whether the string is valid: every opening bracket is closed by the same \
             type of bracket, in the correct order.\n\n\
             Examples: \"()\" -> true, \"()[]{}\" -> true, \"(]\" -> false.",
            Difficulty::Easy,
            "O(n) time, O(n) space",
            &[
                ("s = \"()\"", "true"),
                ("s = \"()[]{}\"", "true"),
                ("s = \"(]\"", "false"),
                ("s = \"([)]\"", "false"),
            ],
            &[
                "Use a stack to match brackets",
                "Push opening brackets; on a closing bracket, pop and compare",
            ],
        ),
        problem(
            "Reverse Linked List",
            "Given the head of a singly linked list, reverse the list and return the \
             new head.\n\n\
             Examples: [1,2,3,4,5] -> [5,4,3,2,1], [1,2] -> [2,1], [] -> [].",
            Difficulty::Easy,
            "O(n) time, O(1) space",
            &[
                ("head = [1,2,3,4,5]", "[5,4,3,2,1]"),
                ("head = [1,2]", "[2,1]"),
                ("head = []", "[]"),
            ],
            &[
                "Keep three pointers: prev, curr, next",
                "Flip one pointer per iteration",
            ],
        ),
        problem(
            "Binary Search",
            "Given a sorted (ascending) integer array nums and a target, return the \
             index of target in nums, or -1 if it is not present.\n\n\
             Example: nums = [-1,0,3,5,9,12], target = 9 -> 4.",
            Difficulty::Easy,
            "O(log n) time, O(1) space",
            &[
                ("nums = [-1,0,3,5,9,12], target = 9", "4"),
                ("nums = [-1,0,3,5,9,12], target = 2", "-1"),
            ],
            &[
                "Maintain left and right bounds and probe the middle",
                "Shrink the half that cannot contain the target",
            ],
        ),
        problem(
            "Merge Two Sorted Lists",
            "Merge two ascending linked lists into one ascending list built from the \
             nodes of the inputs.\n\n\
             Examples: [1,2,4] + [1,3,4] -> [1,1,2,3,4,4], [] + [0] -> [0].",
            Difficulty::Easy,
            "O(n+m) time, O(1) space",
            &[
                ("l1 = [1,2,4], l2 = [1,3,4]", "[1,1,2,3,4,4]"),
                ("l1 = [], l2 = []", "[]"),
                ("l1 = [], l2 = [0]", "[0]"),
            ],
            &[
                "A dummy head node simplifies the edge cases",
                "Repeatedly take the smaller of the two current nodes",
            ],
        ),
        problem(
            "Maximum Subarray",
            "Given an integer array nums, find the contiguous subarray (containing at \
             least one number) with the largest sum and return that sum.\n\n\
             Example: nums = [-2,1,-3,4,-1,2,1,-5,4] -> 6 (subarray [4,-1,2,1]).",
            Difficulty::Medium,
            "O(n) time, O(1) space",
            &[
                ("nums = [-2,1,-3,4,-1,2,1,-5,4]", "6"),
                ("nums = [1]", "1"),
                ("nums = [5,4,-1,7,8]", "23"),
            ],
            &[
                "Kadane's algorithm: track the best sum ending at each index",
                "A running sum that drops below zero is worth restarting",
            ],
        ),
        problem(
            "Climbing Stairs",
            "You are climbing a staircase of n steps. Each move climbs 1 or 2 steps. \
             How many distinct ways can you reach the top?\n\n\
             Examples: n = 2 -> 2, n = 3 -> 3.",
            Difficulty::Easy,
            "O(n) time, O(1) space",
            &[("n = 2", "2"), ("n = 3", "3"), ("n = 4", "5")],
            &[
                "f(n) = f(n-1) + f(n-2)",
                "This is the Fibonacci sequence in disguise",
            ],
        ),
        problem(
            "Coin Change",
            "Given coin denominations coins and a total amount, return the fewest \
             coins needed to make up that amount, or -1 if it cannot be made. You have \
             an unlimited supply of each coin.\n\n\
             Examples: coins = [1,2,5], amount = 11 -> 3 (5+5+1); coins = [2], \
             amount = 3 -> -1.",
            Difficulty::Medium,
            "O(amount * coins) time",
            &[
                ("coins = [1, 2, 5], amount = 11", "3"),
                ("coins = [2], amount = 3", "-1"),
                ("coins = [1], amount = 0", "0"),
            ],
            &[
                "Unbounded knapsack shape",
                "dp[i] = fewest coins to make amount i",
            ],
        ),
    ]
}
