//! 依赖图与拓扑排序
//!
//! 以组件标识为节点的有向图，维护对称的 "uses"/"used-by" 邻接集，
//! 使用 Kahn 度数计数算法计算拓扑顺序并检测环。
//! 节点被驻留为稳定的整数下标，度数就是一个普通的数值数组。

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Display;
use std::hash::Hash;

use volant_common::CircularDependencyError;

/// 依赖图
///
/// 添加边 `(dependant uses dependency)` 会同时把两个端点加入节点集，
/// 因此边引用的节点总在节点集中。`add_node` 与 `add_dependency` 均幂等。
#[derive(Debug, Clone)]
pub struct DependencyGraph<K>
where
    K: Clone + Eq + Hash + Display,
{
    index: HashMap<K, usize>,
    nodes: Vec<K>,
    uses: Vec<HashSet<usize>>,
    used_by: Vec<HashSet<usize>>,
}

impl<K> Default for DependencyGraph<K>
where
    K: Clone + Eq + Hash + Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> DependencyGraph<K>
where
    K: Clone + Eq + Hash + Display,
{
    /// 创建空图
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            nodes: Vec::new(),
            uses: Vec::new(),
            used_by: Vec::new(),
        }
    }

    fn intern(&mut self, key: &K) -> usize {
        if let Some(&i) = self.index.get(key) {
            return i;
        }
        let i = self.nodes.len();
        self.index.insert(key.clone(), i);
        self.nodes.push(key.clone());
        self.uses.push(HashSet::new());
        self.used_by.push(HashSet::new());
        i
    }

    /// 确保节点被跟踪，即使它没有任何边
    ///
    /// 没有依赖关系的独立组件也要出现在输出顺序中。
    pub fn add_node(&mut self, key: K) {
        self.intern(&key);
    }

    /// 记录 `dependant` 使用 `dependency`
    pub fn add_dependency(&mut self, dependant: K, dependency: K) {
        let a = self.intern(&dependant);
        let b = self.intern(&dependency);
        self.uses[a].insert(b);
        self.used_by[b].insert(a);
    }

    /// 节点数量
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 图中是否包含该节点
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// 获取节点直接使用的依赖
    pub fn dependencies_of(&self, key: &K) -> Vec<K> {
        self.index
            .get(key)
            .map(|&i| self.uses[i].iter().map(|&j| self.nodes[j].clone()).collect())
            .unwrap_or_default()
    }

    /// 获取直接使用该节点的依赖方
    pub fn dependants_of(&self, key: &K) -> Vec<K> {
        self.index
            .get(key)
            .map(|&i| {
                self.used_by[i]
                    .iter()
                    .map(|&j| self.nodes[j].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 计算拓扑顺序
    ///
    /// 每个节点的出度是它使用的不同依赖的数量。出度为 0 的节点入队，
    /// 每出队一个节点就把使用它的节点出度减一，归零时入队。队列耗尽后
    /// 若产出的节点数少于总节点数则存在环，错误中列出出度未归零的
    /// 全部节点。出度同时归零的节点之间的顺序不作保证。
    pub fn topological_order(&self) -> Result<Vec<K>, CircularDependencyError> {
        let mut out_degree: Vec<usize> = self.uses.iter().map(HashSet::len).collect();

        let mut queue: VecDeque<usize> = out_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(i, _)| i)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(node) = queue.pop_front() {
            order.push(self.nodes[node].clone());

            for &user in &self.used_by[node] {
                out_degree[user] -= 1;
                if out_degree[user] == 0 {
                    queue.push_back(user);
                }
            }
        }

        if order.len() != self.nodes.len() {
            let mut remaining: Vec<String> = out_degree
                .iter()
                .enumerate()
                .filter(|(_, &degree)| degree > 0)
                .map(|(i, _)| self.nodes[i].to_string())
                .collect();
            remaining.sort();
            return Err(CircularDependencyError { remaining });
        }

        Ok(order)
    }
}
