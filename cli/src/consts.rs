/// Base64 of the ARC-4 method selector for `cast_votes`. Only application
/// calls whose first argument equals this are counted as votes.
pub const CAST_VOTE_SELECTOR: &str = "xA/9qg==";

/// Proposal id of the mock proposal every session carries for procedural reasons.
pub const CONTROL_PROPOSAL_ID: &str = "01";

/// Public mainnet indexer used when no other is configured.
pub const DEFAULT_INDEXER_URL: &str = "https://mainnet-idx.algonode.cloud";

/// Repository folder holding the markdown text of every proposal.
pub const DEFAULT_PROPOSALS_URL: &str =
    "https://raw.githubusercontent.com/algorandfoundation/xGov/main/Proposals";

/// Session used when none is selected.
pub const DEFAULT_SESSION: u32 = 3;

/// Indexer page size. The public indexer caps responses at 1000 transactions.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Upper bound on sequential page fetches for one refresh.
pub const DEFAULT_MAX_PAGES: u32 = 10;

const IPFS_GATEWAY: &str = "https://api.voting.algorand.foundation/ipfs";

pub struct BuiltinSession {
    pub session: u32,
    pub app_id: u64,
    pub total_voting_weight: u64,
    pub metadata_cid: &'static str,
    pub governor_data_cid: &'static str,
    pub proposal_ids: &'static [&'static str],
}

impl BuiltinSession {
    pub fn metadata_url(&self) -> String {
        format!("{}/{}", IPFS_GATEWAY, self.metadata_cid)
    }

    pub fn governor_data_url(&self) -> String {
        format!("{}/{}", IPFS_GATEWAY, self.governor_data_cid)
    }
}

pub const SESSIONS: &[BuiltinSession] = &[
    BuiltinSession {
        session: 1,
        app_id: 1158913461,
        total_voting_weight: 2139007219936,
        metadata_cid: "bafkreigjiien52ukmfqd5yrjgonrj6ixpr2rm32szps45ztpehk7z4lhli",
        governor_data_cid: "bafkreieh77pgmvfexyxbnbexwu4n5x54kgdfop7lzfo26peyrjcwhn6uii",
        proposal_ids: &[
            "06", "08", "09", "14", "17", "18", "19", "20", "23", "24", "25", "26", "28", "30",
            "31", "32", "33", "34", "37", "38", "39", "41", "42", "43", "48", "49", "01",
        ],
    },
    BuiltinSession {
        session: 2,
        app_id: 1236654302,
        total_voting_weight: 3282211058290,
        metadata_cid: "bafkreietvjzxff4lnrxo5pzuo4uvtd3cfc6qj5fyyrjpau2scblwwg63su",
        governor_data_cid: "bafkreicsvkwge2xe64wjxutkcioo3uny7oazobxoml67bcswytesyecexa",
        proposal_ids: &[
            "01", "50", "53", "55", "61", "70", "71", "72", "74", "77", "78", "79", "80", "81",
            "82", "83", "84", "85", "86", "87", "89", "90", "93",
        ],
    },
    BuiltinSession {
        session: 3,
        app_id: 1484325878,
        total_voting_weight: 4109273953185,
        metadata_cid: "bafkreigqdwoypnchizkcc7qdhop5pqxpibjacs6w2anbntyiet3pzrxlme",
        governor_data_cid: "bafybeifdxhkjte7jomil7jcypq67yq65aoigi2qihecdxi2tp2cy6x3ldy",
        proposal_ids: &[
            "92", "95", "96", "98", "99", "100", "104", "107", "108", "109", "110", "112", "113",
            "114", "115", "116", "117", "118", "119", "120", "121", "122", "123", "130", "141",
            "142", "143", "144", "145", "148", "149", "150", "152", "153", "154", "156", "157",
            "158", "159", "160", "161", "162", "163", "164", "165", "167", "168", "170", "01",
        ],
    },
];
