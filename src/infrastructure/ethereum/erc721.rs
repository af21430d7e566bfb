//! ERC-721 bindings for the calls this app makes

alloy::sol! {
    #[sol(rpc)]
    interface IERC721 {
        function ownerOf(uint256 tokenId) external view returns (address owner);
        function tokenURI(uint256 tokenId) external view returns (string memory uri);
        function safeTransferFrom(address from, address to, uint256 tokenId) external;
    }
}
