use super::{QuerySlot, ViewState};
use crate::domain::stats::{
    TaskStats, TopTask, TopTaskPager, driven_ports::StatsReader, driving_ports::StatsPort,
};
use crate::external_connections::ExternalConnectivity;

/// Landing page: completion counts and a paged list of the most important open tasks
#[derive(Debug, Default)]
pub struct HomeView {
    stats: QuerySlot<TaskStats>,
    pager: TopTaskPager,
}

impl HomeView {
    pub fn new() -> HomeView {
        HomeView::default()
    }

    pub async fn load(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        stats_port: &impl StatsPort,
        s_reader: &impl StatsReader,
    ) {
        let ticket = self.stats.begin();
        let stats = stats_port.get_stats(ext_cxn, s_reader).await;
        if self.stats.finish(ticket, stats) {
            self.pager = TopTaskPager::default();
        }
    }

    pub fn stats(&self) -> ViewState<&TaskStats> {
        self.stats.state()
    }

    /// `(completed, incomplete)`, or zeros until the stats arrive
    pub fn counts(&self) -> (u32, u32) {
        self.stats
            .data()
            .map(|stats| (stats.completed, stats.incomplete))
            .unwrap_or_default()
    }

    pub fn top_tasks(&self) -> &[TopTask] {
        match self.stats.data() {
            Some(stats) => self.pager.visible(&stats.top_important_tasks),
            None => &[],
        }
    }

    fn total(&self) -> usize {
        self.stats
            .data()
            .map_or(0, |stats| stats.top_important_tasks.len())
    }

    pub fn can_load_more(&self) -> bool {
        self.pager.can_load_more(self.total())
    }

    pub fn can_go_back(&self) -> bool {
        self.pager.can_go_back()
    }

    pub fn load_more(&mut self) {
        let total = self.total();
        self.pager.load_more(total);
    }

    pub fn go_back(&mut self) {
        self.pager.go_back();
    }
}
