//! Administrative region lookup for charge-device entities.
//!
//! Charge devices are tagged with a realistic `province` / `city` / `county`
//! triple. The triple is resolved from a numeric area code through the
//! [`RegionLookup`] trait so that a scenario can plug in its own table; the
//! built-in [`StaticRegionTable`] covers a fixed set of county-level codes.

/// One resolved administrative region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub code: u32,
    pub province: String,
    pub city: String,
    pub county: String,
}

/// Resolves area codes into regions.
pub trait RegionLookup: Send + Sync {
    /// All area codes the table knows, in a stable order.
    fn codes(&self) -> &[u32];

    /// Resolve a single code.
    fn lookup(&self, code: u32) -> Option<Region>;
}

/// (code, province, city, county)
const REGIONS: &[(u32, &str, &str, &str)] = &[
    (110101, "Beijing", "Beijing", "Dongcheng"),
    (110105, "Beijing", "Beijing", "Chaoyang"),
    (110108, "Beijing", "Beijing", "Haidian"),
    (120101, "Tianjin", "Tianjin", "Heping"),
    (310101, "Shanghai", "Shanghai", "Huangpu"),
    (310115, "Shanghai", "Shanghai", "Pudong"),
    (320102, "Jiangsu", "Nanjing", "Xuanwu"),
    (320505, "Jiangsu", "Suzhou", "Huqiu"),
    (330106, "Zhejiang", "Hangzhou", "Xihu"),
    (330212, "Zhejiang", "Ningbo", "Yinzhou"),
    (340104, "Anhui", "Hefei", "Shushan"),
    (350203, "Fujian", "Xiamen", "Siming"),
    (370102, "Shandong", "Jinan", "Lixia"),
    (370202, "Shandong", "Qingdao", "Shinan"),
    (410105, "Henan", "Zhengzhou", "Jinshui"),
    (420106, "Hubei", "Wuhan", "Wuchang"),
    (430104, "Hunan", "Changsha", "Yuelu"),
    (440106, "Guangdong", "Guangzhou", "Tianhe"),
    (440305, "Guangdong", "Shenzhen", "Nanshan"),
    (500103, "Chongqing", "Chongqing", "Yuzhong"),
    (510107, "Sichuan", "Chengdu", "Wuhou"),
    (530102, "Yunnan", "Kunming", "Wuhua"),
    (610113, "Shaanxi", "Xi'an", "Yanta"),
    (620102, "Gansu", "Lanzhou", "Chengguan"),
];

/// Built-in county-level region table.
#[derive(Debug, Clone)]
pub struct StaticRegionTable {
    codes: Vec<u32>,
}

impl StaticRegionTable {
    pub fn new() -> Self {
        Self {
            codes: REGIONS.iter().map(|(code, ..)| *code).collect(),
        }
    }
}

impl Default for StaticRegionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionLookup for StaticRegionTable {
    fn codes(&self) -> &[u32] {
        &self.codes
    }

    fn lookup(&self, code: u32) -> Option<Region> {
        REGIONS
            .binary_search_by_key(&code, |(c, ..)| *c)
            .ok()
            .map(|i| {
                let (code, province, city, county) = REGIONS[i];
                Region {
                    code,
                    province: province.to_string(),
                    city: city.to_string(),
                    county: county.to_string(),
                }
            })
    }
}
