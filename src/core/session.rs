//! Synchronous driver that performs controller effects against a provider.

use crate::core::autocomplete::{AutocompleteController, Effect, Key, Selection};
use crate::core::error::Result;
use crate::core::provider::TreeProvider;
use crate::core::repo_list_cache::RepositoryListCache;
use crate::core::store::DurableStore;
use std::collections::VecDeque;

pub struct Session<P: TreeProvider, S: DurableStore> {
    provider: P,
    controller: AutocompleteController<S>,
    committed: Vec<Selection>,
}

impl<P: TreeProvider, S: DurableStore> Session<P, S> {
    pub fn new(provider: P, controller: AutocompleteController<S>) -> Self {
        Self {
            provider,
            controller,
            committed: Vec::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn controller(&self) -> &AutocompleteController<S> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut AutocompleteController<S> {
        &mut self.controller
    }

    /// Selections committed so far, oldest first.
    pub fn committed(&self) -> &[Selection] {
        &self.committed
    }

    /// Feed the repository list to the controller, from the durable list
    /// cache when it is fresh and belongs to this provider.
    pub fn load_repositories(&mut self) -> Result<()> {
        let identity = self.provider.identity();
        let clock = self.controller.cache().clock().clone();
        let max_age = self.controller.cache().config().repository_list_max_age_ms;

        let mut list_cache =
            RepositoryListCache::new(self.controller.cache_mut().store_mut(), clock.as_ref(), max_age);
        let repositories = match list_cache.get(&identity) {
            Some(repositories) => {
                log::debug!("Using {} cached repositories", repositories.len());
                repositories
            }
            None => {
                let repositories = self.provider.list_repositories()?;
                list_cache.set(&repositories, &identity);
                repositories
            }
        };

        self.controller.set_repositories(repositories);
        Ok(())
    }

    pub fn input(&mut self, text: &str) {
        let effects = self.controller.set_input(text);
        self.run(effects);
    }

    pub fn key(&mut self, key: Key) {
        let effects = self.controller.handle_key(key);
        self.run(effects);
    }

    pub fn select(&mut self, index: usize) {
        let effects = self.controller.select(index);
        self.run(effects);
    }

    pub fn tick(&mut self) -> bool {
        self.controller.tick()
    }

    /// Run any pending search without waiting for the debounce delay.
    pub fn settle(&mut self) -> bool {
        self.controller.flush_search()
    }

    fn run(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            let next = match effect {
                Effect::FetchTree(request) => {
                    let result =
                        self.provider
                            .fetch_tree(&request.owner, &request.repo, &request.branch);
                    self.controller.complete_tree_fetch(&request, result)
                }
                Effect::FetchFolder { request, path } => {
                    let result = self.provider.fetch_folder(
                        &request.owner,
                        &request.repo,
                        &path,
                        &request.branch,
                    );
                    self.controller.complete_folder_fetch(&request, &path, result)
                }
                Effect::FetchBranches(repository) => {
                    let result = self
                        .provider
                        .fetch_branches(repository.owner(), &repository.name);
                    self.controller.complete_branch_fetch(&repository, result)
                }
                Effect::Commit(selection) => {
                    log::debug!("Committed {}", selection.mention());
                    self.committed.push(selection);
                    Vec::new()
                }
            };
            queue.extend(next);
        }
    }
}
